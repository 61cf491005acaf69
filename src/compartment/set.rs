//! One population's compartment locations.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::iter::FilteredIter;
use super::location::CompartmentLocation;
use crate::error::{CompartmentError, CompartmentResult};
use crate::schema::{self, FieldPath};
use crate::selection::Selection;

const POPULATION_KEY: &str = "population";
const LOCATIONS_KEY: &str = "compartment_set";

/// An ordered list of compartment locations belonging to one population.
///
/// The location buffer is immutable and reference counted, so cloning a set
/// is cheap and never copies locations. Duplicates are kept and insertion
/// order is preserved.
#[derive(Debug, Clone)]
pub struct CompartmentSet {
    population: Arc<str>,
    locations: Arc<[CompartmentLocation]>,
}

impl CompartmentSet {
    pub fn new(
        population: impl Into<Arc<str>>,
        locations: impl Into<Arc<[CompartmentLocation]>>,
    ) -> Self {
        Self {
            population: population.into(),
            locations: locations.into(),
        }
    }

    pub(crate) fn from_value(value: &Value, path: &FieldPath) -> CompartmentResult<Self> {
        let map = schema::object(value, path)?;
        let population = schema::required_str(map, POPULATION_KEY, path)?;
        let items = schema::required_array(map, LOCATIONS_KEY, path)?;

        let items_path = path.key(LOCATIONS_KEY);
        let locations = items
            .iter()
            .enumerate()
            .map(|(i, item)| CompartmentLocation::from_value(item, &items_path.index(i)))
            .collect::<CompartmentResult<Arc<[_]>>>()?;

        Ok(Self::new(population, locations))
    }

    pub fn population(&self) -> &str {
        &self.population
    }

    /// Total number of locations, duplicates included.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Number of locations whose node id is in `selection`.
    ///
    /// An empty selection counts every location.
    pub fn size(&self, selection: &Selection) -> usize {
        if selection.is_empty() {
            return self.locations.len();
        }
        self.locations
            .iter()
            .filter(|loc| selection.contains(loc.node_id()))
            .count()
    }

    /// Copy of the location at `index` in the unfiltered sequence.
    pub fn get(&self, index: usize) -> CompartmentResult<CompartmentLocation> {
        self.locations
            .get(index)
            .copied()
            .ok_or(CompartmentError::IndexOutOfRange {
                index,
                len: self.locations.len(),
            })
    }

    /// Iterate over copies of every location.
    pub fn iter(&self) -> FilteredIter<'_> {
        self.filtered_iter(Selection::all())
    }

    /// Iterate lazily over the locations whose node id is in `selection`.
    pub fn filtered_iter(&self, selection: Selection) -> FilteredIter<'_> {
        FilteredIter::new(&self.locations, 0, selection)
    }

    /// Begin and end cursors bounding one lazy pass over the selected locations.
    pub fn filtered_range(&self, selection: Selection) -> (FilteredIter<'_>, FilteredIter<'_>) {
        let end = FilteredIter::new(&self.locations, self.locations.len(), selection.clone());
        (self.filtered_iter(selection), end)
    }

    /// Sorted, de-duplicated node ids of all locations.
    pub fn node_ids(&self) -> Selection {
        let ids: BTreeSet<u64> = self.locations.iter().map(|loc| loc.node_id()).collect();
        Selection::from_bounded_values(ids)
    }

    /// A new set holding only the locations whose node id is in `selection`.
    ///
    /// Relative order is preserved. An empty selection returns a handle
    /// sharing this set's storage.
    pub fn filter(&self, selection: &Selection) -> CompartmentSet {
        if selection.is_empty() {
            return self.clone();
        }
        let kept: Arc<[CompartmentLocation]> = self
            .locations
            .iter()
            .filter(|loc| selection.contains(loc.node_id()))
            .copied()
            .collect();
        tracing::debug!(
            population = %self.population,
            kept = kept.len(),
            total = self.locations.len(),
            "filtered compartment set"
        );
        Self {
            population: Arc::clone(&self.population),
            locations: kept,
        }
    }

    /// Whether both handles read the same location buffer.
    pub fn shares_storage_with(&self, other: &CompartmentSet) -> bool {
        Arc::ptr_eq(&self.locations, &other.locations)
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(POPULATION_KEY.into(), Value::from(self.population()));
        map.insert(
            LOCATIONS_KEY.into(),
            Value::Array(self.locations.iter().map(CompartmentLocation::to_value).collect()),
        );
        Value::Object(map)
    }

    /// Serialize as `{"population": ..., "compartment_set": [...]}` in storage order.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

impl PartialEq for CompartmentSet {
    fn eq(&self, other: &Self) -> bool {
        self.population == other.population && self.locations == other.locations
    }
}

/// Renders `CompartmentSet(population="pop0", compartments=[CompartmentLocation(1, 10, 0.5), ...])`.
impl std::fmt::Display for CompartmentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompartmentSet(population={:?}, compartments=[", self.population())?;
        for (i, loc) in self.locations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{loc}")?;
        }
        write!(f, "])")
    }
}

impl<'a> IntoIterator for &'a CompartmentSet {
    type Item = CompartmentLocation;
    type IntoIter = FilteredIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<&Value> for CompartmentSet {
    type Error = CompartmentError;

    fn try_from(value: &Value) -> CompartmentResult<Self> {
        Self::from_value(value, &FieldPath::root())
    }
}

impl FromStr for CompartmentSet {
    type Err = CompartmentError;

    fn from_str(s: &str) -> CompartmentResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::try_from(&value)
    }
}

impl Serialize for CompartmentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CompartmentSet", 2)?;
        state.serialize_field(POPULATION_KEY, self.population())?;
        state.serialize_field(LOCATIONS_KEY, &*self.locations)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for CompartmentSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(&value).map_err(serde::de::Error::custom)
    }
}
