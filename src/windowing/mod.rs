//! Mapping file-wide, offset-ordered result lists onto the slice visible in a viewport.

use std::ops::Range;

mod results;

pub use results::{ReplaceResults, Replacement, SearchResults};

#[cfg(test)]
mod tests;

/// Anything with an absolute file offset that result lists are ordered by.
pub trait ResultOffset {
    fn result_offset(&self) -> u64;
}

impl ResultOffset for u64 {
    fn result_offset(&self) -> u64 {
        *self
    }
}

/// The part of a result list that falls inside one viewport window.
///
/// `end` is `None` when the window runs to the end of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCriteria<'a, T> {
    pub start: usize,
    pub end: Option<usize>,
    pub data: &'a [T],
}

impl<T> AsRef<[T]> for IndexCriteria<'_, T> {
    fn as_ref(&self) -> &[T] {
        self.data
    }
}

impl<'a, T> IndexCriteria<'a, T> {
    fn empty(at: usize) -> Self {
        Self {
            start: at,
            end: None,
            data: &[],
        }
    }
    /// Indices of the windowed items within the full list.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.data.len()
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.data.iter()
    }
}

impl<T> std::fmt::Display for IndexCriteria<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}..{end}", self.start),
            None => write!(f, "{}..", self.start),
        }
    }
}

/// Slices `list` down to the items whose offset lies in
/// `[viewport_offset, viewport_offset + capacity)`.
///
/// `list` must be sorted ascending by [`ResultOffset::result_offset`].
pub fn window_results<T: ResultOffset>(
    list: &[T],
    viewport_offset: u64,
    capacity: usize,
) -> IndexCriteria<'_, T> {
    debug_assert!(
        list.is_sorted_by_key(|r| r.result_offset()),
        "result list must be ascending by offset"
    );
    let start = list.partition_point(|r| r.result_offset() < viewport_offset);
    if start == list.len() {
        return IndexCriteria::empty(start);
    }

    let window_end = viewport_offset.saturating_add(capacity as u64);
    let end = start + list[start..].partition_point(|r| r.result_offset() < window_end);

    IndexCriteria {
        start,
        end: (end < list.len()).then_some(end),
        data: &list[start..end],
    }
}
