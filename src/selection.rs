//! Range-compressed sets of node ids.
//!
//! A [`Selection`] stores ids as sorted, non-overlapping, half-open ranges
//! `[start, end)`. Compartment sets consume selections to restrict counting,
//! iteration and filtering to a subset of node ids.
//!
//! An empty selection imposes no restriction: every filtering operation in
//! [`crate::compartment`] treats it as "match everything".

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SelectionError, SelectionResult};

/// A half-open range of node ids, `[start, end)`.
pub type IdRange = (u64, u64);

/// Largest node id a selection can hold.
///
/// Ids share the signed 64-bit range of the columnar storage, which also
/// keeps `id + 1` representable as a half-open range end.
pub const MAX_ID: u64 = i64::MAX as u64;

/// Sorted, merged set of node id ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSelection")]
pub struct Selection {
    ranges: Vec<IdRange>,
}

/// Wire form of a [`Selection`]; normalized through [`Selection::from_ranges`].
#[derive(Deserialize)]
struct RawSelection {
    ranges: Vec<IdRange>,
}

impl TryFrom<RawSelection> for Selection {
    type Error = SelectionError;

    fn try_from(raw: RawSelection) -> SelectionResult<Self> {
        Self::from_ranges(raw.ranges)
    }
}

impl Selection {
    /// The selection with no ranges. Treated as "match everything" by filters.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a selection from half-open ranges.
    ///
    /// Ranges may arrive in any order and may overlap; they are sorted and
    /// merged. Empty ranges (`start == end`) are dropped. Ranges reaching past
    /// [`MAX_ID`] are rejected.
    pub fn from_ranges(ranges: impl IntoIterator<Item = IdRange>) -> SelectionResult<Self> {
        let mut ranges: Vec<IdRange> = ranges
            .into_iter()
            .map(|(start, end)| {
                if start > end {
                    Err(SelectionError::InvalidRange { start, end })
                } else if end > MAX_ID + 1 {
                    Err(SelectionError::IdOutOfRange { id: end - 1 })
                } else {
                    Ok((start, end))
                }
            })
            .filter(|r| !matches!(r, Ok((start, end)) if start == end))
            .collect::<SelectionResult<_>>()?;
        ranges.sort_unstable();

        let mut merged: Vec<IdRange> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        Ok(Self { ranges: merged })
    }

    /// Build a selection from ids sorted in ascending order without duplicates.
    ///
    /// Consecutive ids collapse into a single range. Ids above [`MAX_ID`]
    /// are rejected.
    pub fn from_values(values: impl IntoIterator<Item = u64>) -> SelectionResult<Self> {
        let mut selection = Self::default();
        for id in values {
            if id > MAX_ID {
                return Err(SelectionError::IdOutOfRange { id });
            }
            selection.push_sorted(id);
        }
        Ok(selection)
    }

    /// Like [`from_values`](Self::from_values) for ids already known to be
    /// at most [`MAX_ID`], such as those of validated locations.
    pub(crate) fn from_bounded_values(values: impl IntoIterator<Item = u64>) -> Self {
        let mut selection = Self::default();
        for id in values {
            debug_assert!(id <= MAX_ID);
            selection.push_sorted(id);
        }
        selection
    }

    fn push_sorted(&mut self, id: u64) {
        match self.ranges.last_mut() {
            Some(last) if last.1 == id => last.1 = id + 1,
            Some(last) if id < last.1 => {}
            _ => self.ranges.push((id, id + 1)),
        }
    }

    /// Whether `id` falls inside one of the ranges.
    pub fn contains(&self, id: u64) -> bool {
        let idx = self.ranges.partition_point(|&(start, _)| start <= id);
        idx > 0 && id < self.ranges[idx - 1].1
    }

    /// `true` when the selection holds no ids.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[IdRange] {
        &self.ranges
    }

    /// Number of ids covered by the selection.
    pub fn flat_size(&self) -> u64 {
        self.ranges.iter().map(|(start, end)| end - start).sum()
    }

    /// Expand the ranges into the ordered sequence of ids.
    pub fn flatten(&self) -> Vec<u64> {
        self.ranges
            .iter()
            .flat_map(|&(start, end)| start..end)
            .collect()
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (start, end)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if end - start == 1 {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{}", end - 1)?;
            }
        }
        Ok(())
    }
}

/// Parses `"1,2,10-20"`: comma-separated ids and inclusive dash ranges.
///
/// The empty string parses to the empty selection.
impl FromStr for Selection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_id = |token: &str| {
            token.trim().parse::<u64>().map_err(|e| SelectionError::Parse {
                input: s.to_string(),
                message: format!("\"{}\": {e}", token.trim()),
            })
        };

        let mut ranges = Vec::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (start, last) = match token.split_once('-') {
                Some((a, b)) => (parse_id(a)?, parse_id(b)?),
                None => {
                    let id = parse_id(token)?;
                    (id, id)
                }
            };
            if start > last {
                return Err(SelectionError::Parse {
                    input: s.to_string(),
                    message: format!("range {token} is reversed"),
                });
            }
            if last > MAX_ID {
                return Err(SelectionError::Parse {
                    input: s.to_string(),
                    message: format!("id {last} is above the maximum node id {MAX_ID}"),
                });
            }
            ranges.push((start, last + 1));
        }
        Self::from_ranges(ranges)
    }
}
