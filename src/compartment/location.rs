//! A single compartment address: `(node_id, section_index, offset)`.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{CompartmentError, CompartmentResult};
use crate::schema::{self, FieldPath};
use crate::selection::MAX_ID;

/// Offsets closer than this compare equal.
pub const OFFSET_TOLERANCE: f64 = 1e-4;

/// A recording point on a cell: node id, absolute section index and normalized
/// offset along that section.
///
/// Equality compares `node_id` and `section_index` exactly and `offset` with
/// tolerance [`OFFSET_TOLERANCE`]. This relation is not transitive: `a == b`
/// and `b == c` do not imply `a == c` when offsets sit near the tolerance
/// boundary. Hashing quantizes the offset to a multiple of the tolerance, so
/// two locations that compare equal across a rounding boundary can still hash
/// differently.
///
/// Locations order by `node_id`, then `section_index`, then `offset`, and
/// locations that compare equal order as [`Ordering::Equal`]. Only
/// [`PartialOrd`] is provided since the tolerance equality cannot back a
/// total order.
#[derive(Debug, Clone, Copy)]
pub struct CompartmentLocation {
    node_id: u64,
    section_index: u64,
    offset: f64,
}

impl CompartmentLocation {
    /// Create a location, checking that `offset` lies in `[0, 1]` and that
    /// the ids do not exceed [`MAX_ID`].
    pub fn new(node_id: u64, section_index: u64, offset: f64) -> CompartmentResult<Self> {
        for (field, v) in [("node_id", node_id), ("section_index", section_index)] {
            if v > MAX_ID {
                return Err(CompartmentError::validation(
                    FieldPath::root(),
                    format!("{field} must be at most {MAX_ID}, got {v}"),
                ));
            }
        }
        if !(0.0..=1.0).contains(&offset) {
            return Err(CompartmentError::validation(
                FieldPath::root(),
                format!("offset must be in [0,1], got {offset}"),
            ));
        }
        Ok(Self {
            node_id,
            section_index,
            offset,
        })
    }

    /// Create a location from signed inputs, rejecting negative ids and sections.
    pub fn from_signed(node_id: i64, section_index: i64, offset: f64) -> CompartmentResult<Self> {
        let node_id = u64::try_from(node_id).map_err(|_| {
            CompartmentError::validation(
                FieldPath::root(),
                format!("node_id must be non-negative, got {node_id}"),
            )
        })?;
        let section_index = u64::try_from(section_index).map_err(|_| {
            CompartmentError::validation(
                FieldPath::root(),
                format!("section_index must be non-negative, got {section_index}"),
            )
        })?;
        Self::new(node_id, section_index, offset)
    }

    pub(crate) fn from_value(value: &Value, path: &FieldPath) -> CompartmentResult<Self> {
        let items = schema::tuple(value, 3, path)?;
        Ok(Self {
            node_id: schema::non_negative_integer(&items[0], "node_id", &path.index(0))?,
            section_index: schema::non_negative_integer(
                &items[1],
                "section_index",
                &path.index(1),
            )?,
            offset: schema::unit_interval(&items[2], "offset", &path.index(2))?,
        })
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    /// Absolute section index. Uniquely identifies a section of the cell's
    /// morphology.
    pub fn section_index(&self) -> u64 {
        self.section_index
    }

    /// Normalized position along the section.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// The canonical `[node_id, section_index, offset]` array.
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::from(self.node_id),
            Value::from(self.section_index),
            Value::from(self.offset),
        ])
    }

    /// Serialize as a JSON array with the shortest round-trip float representation.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

impl PartialEq for CompartmentLocation {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
            && self.section_index == other.section_index
            && (self.offset - other.offset).abs() < OFFSET_TOLERANCE
    }
}

// Needed for use as a set or map key; see the type docs for the caveat.
impl Eq for CompartmentLocation {}

impl PartialOrd for CompartmentLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        Some(
            self.node_id
                .cmp(&other.node_id)
                .then(self.section_index.cmp(&other.section_index))
                .then(self.offset.total_cmp(&other.offset)),
        )
    }
}

impl Hash for CompartmentLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_id.hash(state);
        self.section_index.hash(state);
        ((self.offset / OFFSET_TOLERANCE).round() as i64).hash(state);
    }
}

impl std::fmt::Display for CompartmentLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CompartmentLocation({}, {}, {})",
            self.node_id, self.section_index, self.offset
        )
    }
}

impl TryFrom<&Value> for CompartmentLocation {
    type Error = CompartmentError;

    fn try_from(value: &Value) -> CompartmentResult<Self> {
        Self::from_value(value, &FieldPath::root())
    }
}

impl FromStr for CompartmentLocation {
    type Err = CompartmentError;

    fn from_str(s: &str) -> CompartmentResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::try_from(&value)
    }
}

impl Serialize for CompartmentLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.node_id)?;
        tuple.serialize_element(&self.section_index)?;
        tuple.serialize_element(&self.offset)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for CompartmentLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(&value).map_err(serde::de::Error::custom)
    }
}
