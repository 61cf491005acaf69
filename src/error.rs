//! Rich diagnostic error types for compartment sets.
//!
//! Every fallible operation in the crate reports one of these errors. Each
//! variant carries a miette error code and help text, and validation errors
//! carry the JSON field path of the offending value so a malformed document
//! can be fixed without guessing.

use miette::Diagnostic;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Compartment errors
// ---------------------------------------------------------------------------

/// Errors arising from building or querying compartment sets.
#[derive(Debug, Error, Diagnostic)]
pub enum CompartmentError {
    #[error("invalid value at {path}: {message}")]
    #[diagnostic(
        code(compsets::validation),
        help(
            "Compartment set documents map names to objects of the form \
             {{\"population\": \"<name>\", \"compartment_set\": [[node_id, section_index, offset], ...]}}. \
             Node ids and section indices are non-negative integers, offsets lie in [0, 1]."
        )
    )]
    Validation { path: String, message: String },

    #[error("compartment set not found: \"{name}\"")]
    #[diagnostic(
        code(compsets::not_found),
        help("Check the available names with `keys()` or `compsets list <FILE>`.")
    )]
    NotFound { name: String },

    #[error("index {index} out of range for compartment set of size {len}")]
    #[diagnostic(
        code(compsets::index),
        help("Valid indices run from 0 to size() - 1 of the unfiltered set.")
    )]
    IndexOutOfRange { index: usize, len: usize },

    #[error("path does not exist: {path}")]
    #[diagnostic(
        code(compsets::path_not_found),
        help("Check the path to the compartment sets file.")
    )]
    PathNotFound { path: String },

    #[error("failed to read {path}: {source}")]
    #[diagnostic(
        code(compsets::io),
        help("The file exists but could not be read. Check its permissions.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {source}")]
    #[diagnostic(
        code(compsets::json),
        help("The document is not well-formed JSON. Fix the syntax at the reported line and column.")
    )]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Selection(#[from] SelectionError),
}

impl CompartmentError {
    pub(crate) fn validation(path: impl ToString, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CompartmentError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

/// Result type for compartment operations.
pub type CompartmentResult<T> = std::result::Result<T, CompartmentError>;

// ---------------------------------------------------------------------------
// Selection errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SelectionError {
    #[error("invalid range [{start}, {end}): start is past end")]
    #[diagnostic(
        code(compsets::selection::invalid_range),
        help("Selection ranges are half-open [start, end) with start <= end.")
    )]
    InvalidRange { start: u64, end: u64 },

    #[error("node id {id} is above the maximum of 9223372036854775807")]
    #[diagnostic(
        code(compsets::selection::id_out_of_range),
        help("Node ids share the signed 64-bit range; use ids up to i64::MAX.")
    )]
    IdOutOfRange { id: u64 },

    #[error("cannot parse node id list \"{input}\": {message}")]
    #[diagnostic(
        code(compsets::selection::parse),
        help("Use comma-separated ids and inclusive ranges, e.g. \"1,2,10-20\".")
    )]
    Parse { input: String, message: String },
}

pub type SelectionResult<T> = std::result::Result<T, SelectionError>;
