//! Shape validation for compartment set documents.
//!
//! All JSON type checks go through the helpers in this module so that every
//! entity reports malformed input the same way: a [`CompartmentError::Validation`]
//! naming the [`FieldPath`] of the offending value and the expected shape.

use serde_json::{Map, Value};

use crate::error::{CompartmentError, CompartmentResult};
use crate::selection::MAX_ID;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a JSON document, rendered as `$.cs0.compartment_set[3][2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The document root, `$`.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Key(key.to_string()));
        path
    }

    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Index(index));
        path
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Short name of a JSON value's type, used in error messages.
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn object<'a>(value: &'a Value, path: &FieldPath) -> CompartmentResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        CompartmentError::validation(path, format!("expected an object, got {}", kind(value)))
    })
}

pub fn array<'a>(value: &'a Value, path: &FieldPath) -> CompartmentResult<&'a [Value]> {
    value.as_array().map(Vec::as_slice).ok_or_else(|| {
        CompartmentError::validation(path, format!("expected an array, got {}", kind(value)))
    })
}

/// An array of exactly `len` elements.
pub fn tuple<'a>(value: &'a Value, len: usize, path: &FieldPath) -> CompartmentResult<&'a [Value]> {
    let items = array(value, path)?;
    if items.len() != len {
        return Err(CompartmentError::validation(
            path,
            format!("expected an array of exactly {len} elements, got {}", items.len()),
        ));
    }
    Ok(items)
}

/// A key that must be present and hold a string.
pub fn required_str<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
) -> CompartmentResult<&'a str> {
    let value = map.get(key).ok_or_else(|| {
        CompartmentError::validation(path, format!("missing required key \"{key}\" of string type"))
    })?;
    value.as_str().ok_or_else(|| {
        CompartmentError::validation(
            path.key(key),
            format!("expected a string, got {}", kind(value)),
        )
    })
}

/// A key that must be present and hold an array.
pub fn required_array<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
) -> CompartmentResult<&'a [Value]> {
    let value = map.get(key).ok_or_else(|| {
        CompartmentError::validation(path, format!("missing required key \"{key}\" of array type"))
    })?;
    array(value, &path.key(key))
}

/// A number with zero fractional part and no sign, at most [`MAX_ID`].
///
/// Negative integers report `"<field> must be non-negative, got <value>"`,
/// integers above [`MAX_ID`] report `"<field> must be at most <MAX_ID>"`;
/// anything else that is not a whole number reports
/// `"expected non-negative integer"`.
pub fn non_negative_integer(value: &Value, field: &str, path: &FieldPath) -> CompartmentResult<u64> {
    let Value::Number(number) = value else {
        return Err(CompartmentError::validation(
            path,
            format!("expected non-negative integer for {field}, got {value}"),
        ));
    };
    let too_large = || {
        CompartmentError::validation(path, format!("{field} must be at most {MAX_ID}, got {number}"))
    };
    if let Some(v) = number.as_u64() {
        return if v > MAX_ID { Err(too_large()) } else { Ok(v) };
    }
    if let Some(v) = number.as_i64() {
        return Err(CompartmentError::validation(
            path,
            format!("{field} must be non-negative, got {v}"),
        ));
    }
    match number.as_f64() {
        Some(v) if v.fract() == 0.0 && v < 0.0 => Err(CompartmentError::validation(
            path,
            format!("{field} must be non-negative, got {v}"),
        )),
        // 2^63 is the first whole f64 above MAX_ID.
        Some(v) if v.fract() == 0.0 && v < 9_223_372_036_854_775_808.0 => Ok(v as u64),
        Some(v) if v.fract() == 0.0 => Err(too_large()),
        _ => Err(CompartmentError::validation(
            path,
            format!("expected non-negative integer for {field}, got {number}"),
        )),
    }
}

/// A number in the closed unit interval `[0, 1]`.
pub fn unit_interval(value: &Value, field: &str, path: &FieldPath) -> CompartmentResult<f64> {
    let v = value.as_f64().ok_or_else(|| {
        CompartmentError::validation(path, format!("expected a number for {field}, got {value}"))
    })?;
    if !(0.0..=1.0).contains(&v) {
        return Err(CompartmentError::validation(
            path,
            format!("{field} must be in [0,1], got {v}"),
        ));
    }
    Ok(v)
}
