use std::ops::RangeInclusive;

/// A byte selection, in absolute file offsets.
///
/// `original_end` is where the selection ended when it was made. `end` can later move
/// while the selected bytes are being edited, but the highlight always covers the
/// larger of the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection was started from.
    anchor: u64,
    start: Option<u64>,
    end: Option<u64>,
    original_end: Option<u64>,
    active: bool,
}

impl Selection {
    /// Starts making a new selection anchored at `offset`.
    pub fn begin(offset: u64) -> Self {
        Self {
            anchor: offset,
            start: Some(offset),
            end: Some(offset),
            original_end: Some(offset),
            active: false,
        }
    }
    /// Moves the free end of a selection that is still being made.
    ///
    /// Moving behind the anchor selects backwards from it.
    pub fn extend_to(&mut self, offset: u64) {
        if !self.making_selection() {
            return;
        }
        self.start = Some(self.anchor.min(offset));
        self.end = Some(self.anchor.max(offset));
        self.original_end = self.end;
    }
    /// Finishes making the selection. Returns `false` (and resets) if it isn't valid.
    pub fn commit(&mut self) -> bool {
        if self.is_valid() {
            self.active = true;
        } else {
            self.reset();
        }
        self.active
    }
    /// Moves `end` while the selected bytes are edited, leaving `original_end` alone.
    pub fn edit_end(&mut self, end: u64) {
        if self.active {
            self.end = Some(end);
        }
    }
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start(&self) -> Option<u64> {
        self.start
    }
    pub fn end(&self) -> Option<u64> {
        self.end
    }
    pub fn original_end(&self) -> Option<u64> {
        self.original_end
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn is_valid(&self) -> bool {
        match (self.start, self.end, self.original_end) {
            (Some(start), Some(_), Some(original_end)) => original_end >= start,
            _ => false,
        }
    }
    /// Anchored, but not yet committed.
    pub fn making_selection(&self) -> bool {
        self.start.is_some() && !self.active
    }
    /// Offsets to highlight, or `None` if nothing should be.
    pub fn highlighted(&self) -> Option<RangeInclusive<u64>> {
        if !(self.active || self.making_selection()) {
            return None;
        }
        let start = self.start?;
        let end = self.end?.max(self.original_end?);
        (end >= start).then_some(start..=end)
    }
    /// Number of selected bytes, per the current (possibly edited) `end`.
    pub fn len(&self) -> u64 {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end >= start => end - start + 1,
            _ => 0,
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
