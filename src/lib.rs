// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # compartment-sets
//!
//! Compartment sets for large-scale neuronal-circuit simulation data. A
//! compartment set names a collection of recording points ("compartments"), each
//! identified by a node id, an absolute section index and an offset along
//! that section, so simulation and analysis tools can address reporting
//! targets by name and exchange that addressing as JSON.
//!
//! ## Architecture
//!
//! - **Locations** (`compartment::location`): validated `(node_id, section_index, offset)` triples
//! - **Sets** (`compartment::set`): one population's locations behind a shared immutable buffer
//! - **Documents** (`compartment::sets`): name-sorted collections loaded from JSON text or files
//! - **Selections** (`selection`): range-compressed node id sets used for filtering
//! - **Schema** (`schema`): shape checks reporting the JSON path of malformed values
//!
//! ## Library usage
//!
//! ```
//! use compartment_sets::compartment::CompartmentSets;
//! use compartment_sets::selection::Selection;
//!
//! let sets: CompartmentSets =
//!     r#"{"cs0": {"population": "P", "compartment_set": [[1, 1, 0.1], [4, 2, 0.5]]}}"#
//!         .parse()
//!         .unwrap();
//! let cs0 = sets.at("cs0").unwrap();
//! assert_eq!(cs0.population(), "P");
//! assert!(cs0.node_ids().contains(1));
//! assert_eq!(cs0.filter(&Selection::from_values([4]).unwrap()).len(), 1);
//! ```

pub mod compartment;
pub mod error;
pub mod schema;
pub mod selection;

pub use compartment::{CompartmentLocation, CompartmentSet, CompartmentSets, FilteredIter};
pub use error::{CompartmentError, CompartmentResult};
pub use selection::Selection;
