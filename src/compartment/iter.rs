//! Lazy, single-pass iteration over the locations of a compartment set.

use std::iter::FusedIterator;

use super::location::CompartmentLocation;
use crate::selection::Selection;

/// Forward iterator over the locations of a [`CompartmentSet`](super::CompartmentSet)
/// whose node id is selected.
///
/// The iterator owns a copy of the selection and borrows the set's backing
/// slice; it yields copies of the locations, never references into the set.
/// An empty selection matches every location. It is not `Clone`: to iterate
/// again, ask the set for a fresh iterator.
///
/// Two iterators compare equal when they point at the same position of the
/// same backing slice, whatever their selections.
#[derive(Debug)]
pub struct FilteredIter<'a> {
    locations: &'a [CompartmentLocation],
    position: usize,
    selection: Selection,
}

impl<'a> FilteredIter<'a> {
    pub(crate) fn new(
        locations: &'a [CompartmentLocation],
        position: usize,
        selection: Selection,
    ) -> Self {
        let mut iter = Self {
            locations,
            position: position.min(locations.len()),
            selection,
        };
        iter.skip_unselected();
        iter
    }

    fn skip_unselected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        while let Some(loc) = self.locations.get(self.position) {
            if self.selection.contains(loc.node_id()) {
                break;
            }
            self.position += 1;
        }
    }

    /// Copy of the location under the cursor, or `None` at the end.
    pub fn current(&self) -> Option<CompartmentLocation> {
        self.locations.get(self.position).copied()
    }

    /// Move to the next selected location. A no-op once the end is reached.
    pub fn advance(&mut self) {
        if self.position < self.locations.len() {
            self.position += 1;
            self.skip_unselected();
        }
    }

    /// Index of the cursor in the unfiltered backing sequence.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.locations.len()
    }
}

impl Iterator for FilteredIter<'_> {
    type Item = CompartmentLocation;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current()?;
        self.advance();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.locations.len() - self.position;
        if self.selection.is_empty() {
            (remaining, Some(remaining))
        } else {
            (remaining.min(1), Some(remaining))
        }
    }
}

impl FusedIterator for FilteredIter<'_> {}

impl PartialEq for FilteredIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.locations.as_ptr(), other.locations.as_ptr())
            && self.locations.len() == other.locations.len()
            && self.position == other.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Vec<CompartmentLocation> {
        [(1, 10, 0.5), (2, 20, 0.25), (3, 30, 0.75), (2, 20, 0.25)]
            .into_iter()
            .map(|(n, s, o)| CompartmentLocation::new(n, s, o).unwrap())
            .collect()
    }

    #[test]
    fn empty_selection_yields_everything() {
        let locs = locations();
        let ids: Vec<u64> = FilteredIter::new(&locs, 0, Selection::all())
            .map(|l| l.node_id())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 2]);
    }

    #[test]
    fn construction_skips_leading_unselected() {
        let locs = locations();
        let iter = FilteredIter::new(&locs, 0, Selection::from_values([3]).unwrap());
        assert_eq!(iter.position(), 2);
        assert_eq!(iter.current().unwrap().node_id(), 3);
    }

    #[test]
    fn selection_filters_in_order() {
        let locs = locations();
        let ids: Vec<u64> = FilteredIter::new(&locs, 0, Selection::from_values([2, 3]).unwrap())
            .map(|l| l.node_id())
            .collect();
        assert_eq!(ids, vec![2, 3, 2]);
    }

    #[test]
    fn advance_past_end_is_idempotent() {
        let locs = locations();
        let mut iter = FilteredIter::new(&locs, 0, Selection::from_values([1]).unwrap());
        iter.advance();
        assert!(iter.is_at_end());
        iter.advance();
        iter.advance();
        assert_eq!(iter.position(), locs.len());
        assert!(iter.current().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn equality_ignores_selection() {
        let locs = locations();
        let a = FilteredIter::new(&locs, locs.len(), Selection::from_values([1]).unwrap());
        let b = FilteredIter::new(&locs, locs.len(), Selection::all());
        assert_eq!(a, b);

        let other = locations();
        let c = FilteredIter::new(&other, other.len(), Selection::all());
        assert_ne!(a, c);
    }

    #[test]
    fn walking_begin_reaches_end() {
        let locs = locations();
        let mut begin = FilteredIter::new(&locs, 0, Selection::from_values([2]).unwrap());
        let end = FilteredIter::new(&locs, locs.len(), Selection::from_values([2]).unwrap());
        let mut seen = 0;
        while begin != end {
            assert_eq!(begin.current().unwrap().node_id(), 2);
            begin.advance();
            seen += 1;
        }
        assert_eq!(seen, 2);
    }
}
