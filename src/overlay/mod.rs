//! The per-viewport overlay: one indication byte for every byte slot in the viewport.

use std::{ops::Range, sync::Arc};

use crate::{
    indication::{IndicationError, IndicationRegistry, ViewportIndicator},
    windowing::{ReplaceResults, SearchResults},
};

mod selection;

pub use selection::Selection;


/// Everything the overlay is painted from.
#[derive(Debug, Clone, Copy)]
pub struct OverlayState<'a> {
    /// File offset of the first viewport slot.
    pub viewport_offset: u64,
    pub selection: &'a Selection,
    pub search: &'a SearchResults,
    pub replace: &'a ReplaceResults,
    /// File offset the debugger is stopped at, if any.
    pub debugger_pos: Option<u64>,
}

/// Overlay bytes for a single viewport, laid out by a shared [`IndicationRegistry`].
#[derive(Debug, Clone)]
pub struct ViewportOverlay {
    registry: Arc<IndicationRegistry>,
    cells: Vec<u8>,
}

impl ViewportOverlay {
    pub fn new(registry: Arc<IndicationRegistry>, capacity: usize) -> Self {
        Self {
            registry,
            cells: vec![0; capacity],
        }
    }
    pub fn registry(&self) -> &IndicationRegistry {
        &self.registry
    }
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
    /// Overlay byte at viewport `index`; slots past the capacity are blank.
    pub fn cell(&self, index: usize) -> u8 {
        self.cells.get(index).copied().unwrap_or_default()
    }
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }
    /// Resizes to `capacity`, dropping every indication.
    pub fn reset(&mut self, capacity: usize) {
        self.cells.clear();
        self.cells.resize(capacity, 0);
    }

    pub fn clear_indication(&mut self, indicator: ViewportIndicator) -> Result<(), IndicationError> {
        self.registry.clear_indicator(&mut self.cells, indicator)
    }
    pub fn update_search_indications(
        &mut self,
        search: &SearchResults,
        viewport_offset: u64,
    ) -> Result<(), IndicationError> {
        paint_search(&self.registry, &mut self.cells, search, viewport_offset)
    }
    pub fn update_replace_indications(
        &mut self,
        replace: &ReplaceResults,
        viewport_offset: u64,
    ) -> Result<(), IndicationError> {
        paint_replace(&self.registry, &mut self.cells, replace, viewport_offset)
    }
    pub fn update_selection_indications(
        &mut self,
        selection: &Selection,
        viewport_offset: u64,
    ) -> Result<(), IndicationError> {
        paint_selection(&self.registry, &mut self.cells, selection, viewport_offset)
    }
    pub fn update_debugger_pos_indication(
        &mut self,
        byte_pos: Option<u64>,
        viewport_offset: u64,
    ) -> Result<(), IndicationError> {
        paint_debugger(&self.registry, &mut self.cells, byte_pos, viewport_offset)
    }

    /// Repaints every indication from `state`.
    ///
    /// On error the current overlay is left exactly as it was.
    pub fn recompute(&mut self, state: &OverlayState) -> Result<(), IndicationError> {
        self.cells = recompute_overlay(&self.registry, self.cells.len(), state)?;
        Ok(())
    }

    /// Selector of the indicator set in `category` at viewport `index`.
    pub fn class_for(&self, index: usize, category: &str) -> Result<&str, IndicationError> {
        let category = self.registry.category(category)?;
        self.registry.css_selector_for(category, self.cell(index))
    }
    /// Selectors of every indication set at viewport `index`, space separated.
    pub fn classes(&self, index: usize) -> String {
        self.registry.css_selectors(self.cell(index))
    }
}

/// Builds a fresh overlay of `capacity` cells from `state`.
pub fn recompute_overlay(
    registry: &IndicationRegistry,
    capacity: usize,
    state: &OverlayState,
) -> Result<Vec<u8>, IndicationError> {
    let mut cells = vec![0; capacity];
    let offset = state.viewport_offset;

    paint_selection(registry, &mut cells, state.selection, offset)?;
    // Search hits and replacements share a field, only one of them can be shown.
    if state.replace.is_empty() {
        paint_search(registry, &mut cells, state.search, offset)?;
    } else {
        paint_replace(registry, &mut cells, state.replace, offset)?;
    }
    paint_debugger(registry, &mut cells, state.debugger_pos, offset)?;

    Ok(cells)
}

/// Viewport-relative, clamped slot range for `len` bytes starting at file offset `at`.
fn slot_range(at: u64, len: usize, viewport_offset: u64, capacity: usize) -> Range<usize> {
    let start = at.saturating_sub(viewport_offset).min(capacity as u64) as usize;
    let end = at
        .saturating_add(len as u64)
        .saturating_sub(viewport_offset)
        .min(capacity as u64) as usize;
    start..end
}

fn paint_marked(
    registry: &IndicationRegistry,
    cells: &mut [u8],
    indicator: ViewportIndicator,
    ranges: impl Iterator<Item = Range<usize>>,
) -> Result<(), IndicationError> {
    let mut marked = vec![false; cells.len()];
    for range in ranges {
        marked[range].fill(true);
    }
    registry.clear_and_set_if(cells, indicator, |_, i| marked[i])
}

fn paint_search(
    registry: &IndicationRegistry,
    cells: &mut [u8],
    search: &SearchResults,
    viewport_offset: u64,
) -> Result<(), IndicationError> {
    let capacity = cells.len();
    let window = search.window(viewport_offset, capacity);
    let ranges = window
        .iter()
        .map(|hit| slot_range(*hit, search.byte_length(), viewport_offset, capacity));
    paint_marked(registry, cells, ViewportIndicator::SearchResult, ranges)
}

fn paint_replace(
    registry: &IndicationRegistry,
    cells: &mut [u8],
    replace: &ReplaceResults,
    viewport_offset: u64,
) -> Result<(), IndicationError> {
    let capacity = cells.len();
    let window = replace.window(viewport_offset, capacity);
    let ranges = window
        .iter()
        .map(|r| slot_range(r.offset, r.byte_length, viewport_offset, capacity));
    paint_marked(registry, cells, ViewportIndicator::Replacement, ranges)
}

fn paint_selection(
    registry: &IndicationRegistry,
    cells: &mut [u8],
    selection: &Selection,
    viewport_offset: u64,
) -> Result<(), IndicationError> {
    let Some(highlight) = selection.highlighted() else {
        return registry.clear_indicator(cells, ViewportIndicator::Selected);
    };
    let capacity = cells.len();
    let len = (highlight.end() - highlight.start()).saturating_add(1) as usize;
    let range = slot_range(*highlight.start(), len, viewport_offset, capacity);
    paint_marked(
        registry,
        cells,
        ViewportIndicator::Selected,
        std::iter::once(range),
    )
}

fn paint_debugger(
    registry: &IndicationRegistry,
    cells: &mut [u8],
    byte_pos: Option<u64>,
    viewport_offset: u64,
) -> Result<(), IndicationError> {
    registry.clear_and_set_if(cells, ViewportIndicator::BytePos1b, |_, i| {
        byte_pos == Some(viewport_offset + i as u64)
    })
}
