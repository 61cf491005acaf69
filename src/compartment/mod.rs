//! Compartment sets: named collections of sub-cellular recording locations.
//!
//! A [`CompartmentLocation`] addresses one point on a cell, a
//! [`CompartmentSet`] groups locations of one population, and
//! [`CompartmentSets`] maps names to sets and is the unit read from and
//! written to JSON documents.

pub mod iter;
pub mod location;
pub mod set;
pub mod sets;

pub use iter::FilteredIter;
pub use location::{CompartmentLocation, OFFSET_TOLERANCE};
pub use set::CompartmentSet;
pub use sets::CompartmentSets;
