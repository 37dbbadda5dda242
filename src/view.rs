//! A scrollable view over one file, tying the fetched viewport to its overlay and query results.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    display::{
        Encoding, Radix, encoded_string_to_bytes, logical_text_render, make_address_range,
        render_radix_text,
    },
    engine::{EditingEngine, ReplaceRequest, SearchRequest},
    errors::ViewResult,
    indication::IndicationRegistry,
    overlay::{OverlayState, Selection, ViewportOverlay},
    viewport::{DEFAULT_VIEWPORT_CAPACITY, FetchTicket, ViewportDataStore},
    windowing::{IndexCriteria, ReplaceResults, Replacement, SearchResults},
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    pub radix: Radix,
    pub address_radix: Radix,
    pub lines_displayed: usize,
    /// Bytes fetched per viewport.
    pub capacity: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            radix: Radix::Hexadecimal,
            address_radix: Radix::Hexadecimal,
            lines_displayed: 20,
            capacity: DEFAULT_VIEWPORT_CAPACITY,
        }
    }
}

/// The three text columns of the visible rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedView {
    pub address: String,
    pub physical: String,
    pub logical: String,
}

/// Search query options, on top of the pattern itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub encoding: Encoding,
    pub case_insensitive: bool,
    pub limit: usize,
}

pub struct DataView<E> {
    engine: E,
    store: ViewportDataStore,
    overlay: ViewportOverlay,
    search: SearchResults,
    replace: ReplaceResults,
    selection: Selection,
    debugger_pos: Option<u64>,
    config: ViewConfig,
    /// File offset of the first visible row.
    top: u64,
}

impl<E: EditingEngine> DataView<E> {
    pub fn new(
        engine: E,
        registry: Arc<IndicationRegistry>,
        config: ViewConfig,
    ) -> ViewResult<Self> {
        let mut view = Self {
            engine,
            store: ViewportDataStore::new(),
            overlay: ViewportOverlay::new(registry, config.capacity),
            search: SearchResults::default(),
            replace: ReplaceResults::default(),
            selection: Selection::default(),
            debugger_pos: None,
            config,
            top: 0,
        };
        view.fetch(0)?;
        Ok(view)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
    pub fn store(&self) -> &ViewportDataStore {
        &self.store
    }
    pub fn overlay(&self) -> &ViewportOverlay {
        &self.overlay
    }
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }
    pub fn top(&self) -> u64 {
        self.top
    }
    pub fn bytes_per_row(&self) -> usize {
        self.config.radix.bytes_per_row()
    }
    pub fn search_results(&self) -> &SearchResults {
        &self.search
    }
    pub fn replace_results(&self) -> &ReplaceResults {
        &self.replace
    }
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
    fn viewport_offset(&self) -> u64 {
        self.store.get().file_offset()
    }

    /// Starts a viewport fetch for `offset`. Pair with [`Self::complete_fetch`].
    pub fn begin_fetch(&mut self, offset: u64) -> FetchTicket {
        self.store.begin_fetch(offset)
    }
    /// Fetches the viewport for `ticket` and applies it, unless a newer fetch has started since.
    ///
    /// If the new window doesn't hold the top row, the top row moves into it, or another
    /// fetch is made around the top row when that can't work.
    pub fn complete_fetch(&mut self, ticket: FetchTicket) -> ViewResult<bool> {
        if !self.apply_fetch(ticket)? {
            return Ok(false);
        }
        self.settle_top()?;
        self.recompute_overlay()?;
        Ok(true)
    }

    fn apply_fetch(&mut self, ticket: FetchTicket) -> ViewResult<bool> {
        if !self.store.is_current(ticket) {
            debug!("Skipping superseded fetch at {}", ticket.offset);
            return Ok(false);
        }
        let viewport = self.engine.fetch_viewport(ticket.offset, self.config.capacity)?;
        if !self.store.complete_fetch(ticket, viewport) {
            return Ok(false);
        }
        self.top = self.top.min(self.max_top());
        Ok(true)
    }

    /// Whether the top row is within the fetched bytes (or at the start of an empty window).
    fn top_in_window(&self) -> bool {
        let viewport = self.store.get();
        let start = viewport.file_offset();
        let end = start + viewport.len() as u64;
        self.top == start || (start..end).contains(&self.top)
    }

    fn settle_top(&mut self) -> ViewResult<()> {
        if self.top_in_window() {
            return Ok(());
        }
        let viewport = self.store.get();
        if !viewport.is_empty() {
            let bpr = self.bytes_per_row() as u64;
            let first_row = viewport.file_offset().next_multiple_of(bpr);
            let top = first_row.min(self.max_top());
            let end = viewport.file_offset() + viewport.len() as u64;
            if top >= viewport.file_offset() && top < end {
                self.top = top;
                return Ok(());
            }
        }
        let fetch_at = self.fetch_offset_for_top();
        let ticket = self.store.begin_fetch(fetch_at);
        debug!("Top {} is outside the viewport, fetching at {}", self.top, ticket.offset);
        self.apply_fetch(ticket)?;
        if !self.top_in_window() {
            warn!("Top {} still outside the viewport after refetching", self.top);
        }
        Ok(())
    }

    /// Where to fetch so the top row lands a quarter of the way into the window,
    /// leaving room to scroll back up.
    ///
    /// The lead-in shrinks when the window couldn't otherwise hold a whole screen below it.
    fn fetch_offset_for_top(&self) -> u64 {
        let capacity = self.config.capacity as u64;
        let screen = (self.config.lines_displayed * self.bytes_per_row()) as u64;
        let lead = self.align((capacity / 4).min(capacity.saturating_sub(screen)));
        self.align(self.top).saturating_sub(lead)
    }

    fn fetch(&mut self, offset: u64) -> ViewResult<()> {
        let ticket = self.begin_fetch(offset);
        self.complete_fetch(ticket)?;
        Ok(())
    }

    /// Re-reads the current viewport, e.g. after the file changed.
    pub fn refresh(&mut self) -> ViewResult<()> {
        self.fetch(self.viewport_offset())
    }

    /// Repaints the overlay from the current selection and query results.
    pub fn recompute_overlay(&mut self) -> ViewResult<()> {
        let state = OverlayState {
            viewport_offset: self.viewport_offset(),
            selection: &self.selection,
            search: &self.search,
            replace: &self.replace,
            debugger_pos: self.debugger_pos,
        };
        self.overlay.recompute(&state)?;
        Ok(())
    }

    fn align(&self, offset: u64) -> u64 {
        let bpr = self.bytes_per_row() as u64;
        offset - offset % bpr
    }

    /// Highest `top` that still fills the screen, or shows the last row.
    pub fn max_top(&self) -> u64 {
        let last_row = self.align(self.store.offset_max().saturating_sub(1));
        let screen = (self.config.lines_displayed.saturating_sub(1) * self.bytes_per_row()) as u64;
        last_row.saturating_sub(screen)
    }

    /// Scrolls so the row holding `offset` is at the top (or as close as the file allows).
    pub fn seek(&mut self, offset: u64) -> ViewResult<()> {
        self.top = self.align(offset).min(self.max_top());

        let below = self.top < self.store.lower_fetch_boundary();
        let above = self.top
            > self
                .store
                .upper_fetch_boundary(self.bytes_per_row(), self.config.lines_displayed)
            && self.store.get().bytes_left() > 0;
        if below || above {
            let fetch_at = self.fetch_offset_for_top();
            debug!("Top {} left the viewport, fetching at {fetch_at}", self.top);
            self.fetch(fetch_at)?;
        }
        Ok(())
    }

    /// Parses `input` in the address radix and seeks to it.
    pub fn seek_input(&mut self, input: &str) -> ViewResult<u64> {
        let offset = self.store.parse_seek_offset(input, self.config.address_radix)?;
        self.seek(offset)?;
        Ok(offset)
    }

    pub fn scroll_lines(&mut self, lines: i64) -> ViewResult<()> {
        let delta = lines.unsigned_abs() * self.bytes_per_row() as u64;
        let target = if lines < 0 {
            self.top.saturating_sub(delta)
        } else {
            self.top.saturating_add(delta)
        };
        self.seek(target)
    }

    pub fn scroll_pages(&mut self, pages: i64) -> ViewResult<()> {
        self.scroll_lines(pages * self.config.lines_displayed as i64)
    }

    /// Changes the display radix, keeping the top row in place.
    pub fn set_radix(&mut self, radix: Radix) -> ViewResult<()> {
        self.config.radix = radix;
        self.seek(self.top)
    }

    pub fn set_address_radix(&mut self, radix: Radix) {
        self.config.address_radix = radix;
    }

    pub fn set_selection(&mut self, selection: Selection) -> ViewResult<()> {
        self.selection = selection;
        self.recompute_overlay()
    }

    pub fn set_debugger_pos(&mut self, byte_pos: Option<u64>) -> ViewResult<()> {
        self.debugger_pos = byte_pos;
        self.recompute_overlay()
    }

    /// Runs a search over the whole file, replacing any earlier search or replace results.
    ///
    /// Returns the number of matches kept.
    pub fn search(&mut self, pattern: &[u8], options: QueryOptions) -> ViewResult<usize> {
        let request = SearchRequest {
            pattern: pattern.to_vec(),
            case_insensitive: options.case_insensitive,
            offset: 0,
            length: None,
            limit: options.limit.saturating_add(1),
        };
        let offsets = self.engine.search(&request)?;
        self.search = SearchResults::from_engine(offsets, pattern.len(), options.limit);
        self.replace.clear();
        info!(
            "Search found {} matches{}",
            self.search.len(),
            if self.search.overflow() { " (overflow)" } else { "" }
        );
        self.recompute_overlay()?;
        Ok(self.search.len())
    }

    /// [`Self::search`], with the pattern given as text in `options.encoding`.
    pub fn search_text(&mut self, text: &str, options: QueryOptions) -> ViewResult<usize> {
        let pattern = encoded_string_to_bytes(text, options.encoding)?;
        self.search(&pattern, options)
    }

    /// Replaces every match of `pattern` in the file.
    ///
    /// Earlier search results no longer line up with the edited file, so they're dropped.
    pub fn replace(
        &mut self,
        pattern: &[u8],
        replacement: &[u8],
        case_insensitive: bool,
    ) -> ViewResult<&[Replacement]> {
        let request = ReplaceRequest {
            pattern: pattern.to_vec(),
            replacement: replacement.to_vec(),
            case_insensitive,
            offset: 0,
            length: None,
        };
        let records = self.engine.replace(&request)?;
        self.replace = ReplaceResults::new(records);
        self.search.clear();
        self.refresh()?;
        Ok(self.replace.records())
    }

    /// [`Self::replace`], with both sides given as text in `encoding`.
    pub fn replace_text(
        &mut self,
        pattern: &str,
        replacement: &str,
        encoding: Encoding,
        case_insensitive: bool,
    ) -> ViewResult<usize> {
        let pattern = encoded_string_to_bytes(pattern, encoding)?;
        let replacement = encoded_string_to_bytes(replacement, encoding)?;
        Ok(self.replace(&pattern, &replacement, case_insensitive)?.len())
    }

    /// Moves to the next match (wrapping), scrolling it into view.
    pub fn select_next_hit(&mut self) -> ViewResult<Option<u64>> {
        let hit = self.search.select_next();
        self.seek_hit(hit)
    }

    pub fn select_prev_hit(&mut self) -> ViewResult<Option<u64>> {
        let hit = self.search.select_prev();
        self.seek_hit(hit)
    }

    fn seek_hit(&mut self, hit: Option<u64>) -> ViewResult<Option<u64>> {
        if let Some(offset) = hit {
            self.seek(offset)?;
        }
        Ok(hit)
    }

    /// Search matches inside the current viewport.
    pub fn search_window(&self) -> IndexCriteria<'_, u64> {
        self.search.window(self.viewport_offset(), self.config.capacity)
    }

    pub fn replace_window(&self) -> IndexCriteria<'_, Replacement> {
        self.replace.window(self.viewport_offset(), self.config.capacity)
    }

    /// Viewport-relative index range of the visible bytes.
    fn visible_range(&self) -> std::ops::Range<usize> {
        let len = self.store.get().len();
        let start = (self.top.saturating_sub(self.viewport_offset()) as usize).min(len);
        let end = start
            .saturating_add(self.config.lines_displayed * self.bytes_per_row())
            .min(len);
        start..end
    }

    pub fn visible_bytes(&self) -> &[u8] {
        let range = self.visible_range();
        self.store.subarray(range.start, range.end)
    }

    /// Overlay bytes lined up with [`Self::visible_bytes`].
    pub fn visible_cells(&self) -> &[u8] {
        let range = self.visible_range();
        let cells = self.overlay.cells();
        let end = range.end.min(cells.len());
        &cells[range.start.min(end)..end]
    }

    /// Selector for `category` at the `index`th visible byte.
    pub fn overlay_class_for(&self, index: usize, category: &str) -> ViewResult<&str> {
        let index = self.visible_range().start + index;
        Ok(self.overlay.class_for(index, category)?)
    }

    pub fn render(&self) -> RenderedView {
        let range = self.visible_range();
        let bytes = self.store.subarray(range.start, range.end);
        let bpr = self.bytes_per_row();
        // Number rows from the bytes actually shown.
        let first_offset = self.viewport_offset() + range.start as u64;
        let start_line = first_offset / bpr as u64;
        let end_line = start_line + bytes.len().div_ceil(bpr) as u64;
        RenderedView {
            address: make_address_range(
                start_line,
                end_line,
                bpr as u64,
                self.config.address_radix,
            ),
            physical: render_radix_text(bytes, self.config.radix, bpr),
            logical: logical_text_render(bytes, bpr),
        }
    }
}
