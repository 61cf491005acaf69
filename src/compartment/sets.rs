//! Named collections of compartment sets: the on-disk document unit.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::set::CompartmentSet;
use crate::error::{CompartmentError, CompartmentResult};
use crate::schema::{self, FieldPath};

/// Compartment sets keyed by name.
///
/// Names iterate in lexicographic order regardless of their order in the
/// source document. Values are cheap shared handles and may outlive the
/// collection.
#[derive(Debug, Clone, Default)]
pub struct CompartmentSets {
    sets: BTreeMap<String, CompartmentSet>,
}

impl CompartmentSets {
    fn from_value(value: &Value) -> CompartmentResult<Self> {
        let root = FieldPath::root();
        let map = schema::object(value, &root)?;
        let sets: BTreeMap<String, CompartmentSet> = map
            .iter()
            .map(|(name, set)| {
                CompartmentSet::from_value(set, &root.key(name)).map(|set| (name.clone(), set))
            })
            .collect::<CompartmentResult<_>>()?;
        Ok(Self { sets })
    }

    /// Load a compartment sets file.
    pub fn from_file(path: impl AsRef<Path>) -> CompartmentResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CompartmentError::PathNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| CompartmentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let sets: Self = content.parse()?;
        tracing::info!(
            path = %path.display(),
            count = sets.len(),
            "loaded compartment sets"
        );
        Ok(sets)
    }

    /// Number of named sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    /// Names in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.sets.keys().map(String::as_str)
    }

    /// Sets in [`keys`](Self::keys) order.
    pub fn values(&self) -> impl Iterator<Item = &CompartmentSet> + '_ {
        self.sets.values()
    }

    /// `(name, set)` pairs in [`keys`](Self::keys) order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &CompartmentSet)> + '_ {
        self.sets.iter().map(|(name, set)| (name.as_str(), set))
    }

    pub fn get(&self, name: &str) -> Option<&CompartmentSet> {
        self.sets.get(name)
    }

    /// A handle to the set called `name`, sharing its storage.
    pub fn at(&self, name: &str) -> CompartmentResult<CompartmentSet> {
        self.sets
            .get(name)
            .cloned()
            .ok_or_else(|| CompartmentError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .sets
            .iter()
            .map(|(name, set)| (name.clone(), set.to_value()))
            .collect();
        Value::Object(map)
    }

    /// Serialize as an object keyed by name, in name order.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Indented form of [`to_json`](Self::to_json).
    pub fn to_json_pretty(&self) -> CompartmentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl PartialEq for CompartmentSets {
    fn eq(&self, other: &Self) -> bool {
        self.sets.len() == other.sets.len()
            && self
                .sets
                .iter()
                .all(|(name, set)| other.sets.get(name) == Some(set))
    }
}

impl std::fmt::Display for CompartmentSets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompartmentSets({{")?;
        for (i, (name, set)) in self.sets.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name:?}: {set}")?;
        }
        write!(f, "}})")
    }
}

impl<'a> IntoIterator for &'a CompartmentSets {
    type Item = (&'a String, &'a CompartmentSet);
    type IntoIter = std::collections::btree_map::Iter<'a, String, CompartmentSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

/// Later entries replace earlier ones with the same name.
impl FromIterator<(String, CompartmentSet)> for CompartmentSets {
    fn from_iter<I: IntoIterator<Item = (String, CompartmentSet)>>(iter: I) -> Self {
        Self {
            sets: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<&Value> for CompartmentSets {
    type Error = CompartmentError;

    fn try_from(value: &Value) -> CompartmentResult<Self> {
        Self::from_value(value)
    }
}

impl FromStr for CompartmentSets {
    type Err = CompartmentError;

    fn from_str(s: &str) -> CompartmentResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(&value)
    }
}

impl Serialize for CompartmentSets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.sets)
    }
}

impl<'de> Deserialize<'de> for CompartmentSets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Selection;

    const SETS: &str = r#"{
        "cs1": {"population": "pop1", "compartment_set": [[0, 10, 0.2], [3, 11, 0.2]]},
        "cs0": {"population": "pop0", "compartment_set": [[1, 1, 0.1], [0, 2, 0.9], [1, 3, 1.0]]}
    }"#;

    fn sets() -> CompartmentSets {
        SETS.parse().unwrap()
    }

    #[test]
    fn parse_and_query() {
        let s = sets();
        assert_eq!(s.len(), 2);
        assert!(!s.is_empty());
        assert!(s.contains("cs0"));
        assert!(s.contains("cs1"));
        assert!(!s.contains("cs2"));
        assert_eq!(s.at("cs1").unwrap().population(), "pop1");
        assert_eq!(s.get("cs0").unwrap().len(), 3);
    }

    #[test]
    fn keys_are_sorted_regardless_of_document_order() {
        let s: CompartmentSets = r#"{
            "b": {"population": "p", "compartment_set": []},
            "a": {"population": "p", "compartment_set": []}
        }"#
        .parse()
        .unwrap();
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn values_and_items_follow_key_order() {
        let s = sets();
        let populations: Vec<&str> = s.values().map(CompartmentSet::population).collect();
        assert_eq!(populations, vec!["pop0", "pop1"]);

        let items: Vec<(&str, usize)> = s.items().map(|(k, v)| (k, v.len())).collect();
        assert_eq!(items, vec![("cs0", 3), ("cs1", 2)]);
    }

    #[test]
    fn at_unknown_name_is_not_found() {
        assert!(matches!(
            sets().at("missing"),
            Err(CompartmentError::NotFound { name }) if name == "missing"
        ));
    }

    #[test]
    fn handles_share_storage_and_outlive_collection() {
        let s = sets();
        let a = s.at("cs0").unwrap();
        let b = s.at("cs0").unwrap();
        assert!(a.shares_storage_with(&b));
        drop(s);
        assert_eq!(a.node_ids(), Selection::from_values([0, 1]).unwrap());
    }

    #[test]
    fn any_invalid_set_fails_the_whole_document() {
        for bad in [
            "1",
            r#"["array"]"#,
            r#"{"cs0": 1}"#,
            r#"{"cs0": null}"#,
            r#"{"cs0": {"compartment_set": []}}"#,
            r#"{"s": {"population": "p"}}"#,
            r#"{"cs0": {"population": null, "compartment_set": []}}"#,
            r#"{"cs0": {"population": "p", "compartment_set": "not an array"}}"#,
            r#"{"cs0": {"population": "p", "compartment_set": [[1, 2]]}}"#,
            r#"{"cs0": {"population": "p", "compartment_set": [["x", 0, 0.5]]}}"#,
            r#"{"ok": {"population": "p", "compartment_set": []},
                "cs0": {"population": "p", "compartment_set": [[1, 0, -0.1]]}}"#,
        ] {
            assert!(bad.parse::<CompartmentSets>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn error_path_names_the_set() {
        let err = r#"{"cs0": {"population": "p", "compartment_set": [[1, 0, 1.1]]}}"#
            .parse::<CompartmentSets>()
            .unwrap_err();
        assert!(err.to_string().contains("$.cs0.compartment_set[0][2]"));
    }

    #[test]
    fn equality_by_name_lookup() {
        assert_eq!(sets(), sets());

        let fewer: CompartmentSets =
            r#"{"cs0": {"population": "pop0", "compartment_set": [[1, 1, 0.1], [0, 2, 0.9], [1, 3, 1.0]]}}"#
                .parse()
                .unwrap();
        assert_ne!(sets(), fewer);
        assert_ne!(fewer, sets());

        let renamed: CompartmentSets = SETS.replace("cs1", "cs9").parse().unwrap();
        assert_ne!(sets(), renamed);
    }

    #[test]
    fn json_round_trip_in_name_order() {
        let s = sets();
        let json = s.to_json();
        assert!(json.find("\"cs0\"").unwrap() < json.find("\"cs1\"").unwrap());
        let back: CompartmentSets = json.parse().unwrap();
        assert_eq!(back, s);

        let pretty: CompartmentSets = s.to_json_pretty().unwrap().parse().unwrap();
        assert_eq!(pretty, s);
    }

    #[test]
    fn collect_from_named_sets() {
        let s = sets();
        let cs0 = s.at("cs0").unwrap();
        let collected: CompartmentSets = [("z".to_string(), cs0.clone()), ("a".to_string(), cs0)]
            .into_iter()
            .collect();
        assert_eq!(collected.keys().collect::<Vec<_>>(), vec!["a", "z"]);
        assert!(collected.at("a").unwrap().shares_storage_with(&s.at("cs0").unwrap()));
    }

    #[test]
    fn empty_document() {
        let s: CompartmentSets = "{}".parse().unwrap();
        assert!(s.is_empty());
        assert_eq!(s.to_json(), "{}");
        assert_eq!(s.to_string(), "CompartmentSets({})");
    }

    #[test]
    fn display_lists_sets() {
        let s = sets();
        assert_eq!(
            s.to_string(),
            "CompartmentSets({\"cs0\": CompartmentSet(population=\"pop0\", compartments=[\
             CompartmentLocation(1, 1, 0.1), CompartmentLocation(0, 2, 0.9), CompartmentLocation(1, 3, 1)]), \
             \"cs1\": CompartmentSet(population=\"pop1\", compartments=[\
             CompartmentLocation(0, 10, 0.2), CompartmentLocation(3, 11, 0.2)])})"
        );
    }
}
