use tracing::debug;

use super::{IndexCriteria, ResultOffset, window_results};

/// Every match of the last search, ascending by file offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    offsets: Vec<u64>,
    byte_length: usize,
    overflow: bool,
    /// Cursor used when stepping between matches.
    index: usize,
}

impl SearchResults {
    /// Builds results from an engine response that was asked for `limit + 1` matches.
    ///
    /// Anything past `limit` is dropped and flagged as `overflow`.
    pub fn from_engine(mut offsets: Vec<u64>, byte_length: usize, limit: usize) -> Self {
        let overflow = offsets.len() > limit;
        if overflow {
            debug!(
                "Search returned {} matches, keeping the first {limit}",
                offsets.len()
            );
            offsets.truncate(limit);
        }
        Self {
            offsets,
            byte_length,
            overflow,
            index: 0,
        }
    }
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }
    /// Length in bytes of the searched-for pattern.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }
    /// `true` if the engine had more matches than were requested.
    pub fn overflow(&self) -> bool {
        self.overflow
    }
    pub fn len(&self) -> usize {
        self.offsets.len()
    }
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
    pub fn index(&self) -> usize {
        self.index
    }
    /// File offset of the match under the cursor.
    pub fn current(&self) -> Option<u64> {
        self.offsets.get(self.index).copied()
    }
    /// Moves the cursor to `index`, wrapping around in either direction.
    pub fn select(&mut self, index: isize) -> Option<u64> {
        if self.offsets.is_empty() {
            return None;
        }
        self.index = index.rem_euclid(self.offsets.len() as isize) as usize;
        self.current()
    }
    pub fn select_next(&mut self) -> Option<u64> {
        self.select(self.index as isize + 1)
    }
    pub fn select_prev(&mut self) -> Option<u64> {
        self.select(self.index as isize - 1)
    }
    pub fn window(&self, viewport_offset: u64, capacity: usize) -> IndexCriteria<'_, u64> {
        window_results(&self.offsets, viewport_offset, capacity)
    }
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One replacement performed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub offset: u64,
    /// Length of the inserted bytes.
    pub byte_length: usize,
}

impl ResultOffset for Replacement {
    fn result_offset(&self) -> u64 {
        self.offset
    }
}

/// Replacements made since the last clear, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceResults {
    records: Vec<Replacement>,
}

impl ReplaceResults {
    pub fn new(records: Vec<Replacement>) -> Self {
        debug_assert!(records.is_sorted_by_key(|r| r.offset));
        Self { records }
    }
    pub fn records(&self) -> &[Replacement] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    pub fn window(&self, viewport_offset: u64, capacity: usize) -> IndexCriteria<'_, Replacement> {
        window_results(&self.records, viewport_offset, capacity)
    }
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
