//! The window of file bytes currently fetched from the editing engine.

use tracing::debug;

use crate::display::{
    EditTarget, Radix, logical_text_render, regex_edit_data_test, render_radix_text,
};

#[cfg(test)]
mod tests;

/// Default number of bytes fetched per viewport (64 rows of 16).
pub const DEFAULT_VIEWPORT_CAPACITY: usize = 16 * 64;
/// Largest viewport the editing engine will serve.
pub const VIEWPORT_CAPACITY_MAX: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewportError {
    #[error("viewport holds {length} bytes, but its capacity is only {capacity}")]
    CapacityExceeded { length: usize, capacity: usize },
    #[error("Exceeds filesize")]
    SeekOutOfRange(u64),
    #[error("Invalid characters")]
    InvalidSeekInput,
    #[error("No seek offset given")]
    EmptySeekInput,
}

/// A snapshot of the bytes in `[file_offset, file_offset + len)`.
///
/// Always replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewportData {
    data: Vec<u8>,
    file_offset: u64,
    bytes_left: u64,
    capacity: usize,
}

impl ViewportData {
    pub fn new(
        data: Vec<u8>,
        file_offset: u64,
        bytes_left: u64,
        capacity: usize,
    ) -> Result<Self, ViewportError> {
        if data.len() > capacity {
            return Err(ViewportError::CapacityExceeded {
                length: data.len(),
                capacity,
            });
        }
        Ok(Self {
            data,
            file_offset,
            bytes_left,
            capacity,
        })
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    /// Absolute file offset of `data()[0]`.
    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// Bytes in the file past the end of this window.
    pub fn bytes_left(&self) -> u64 {
        self.bytes_left
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn file_size(&self) -> u64 {
        self.file_offset + self.data.len() as u64 + self.bytes_left
    }
    /// One past the last file offset this window could hold at full capacity.
    pub fn window_end(&self) -> u64 {
        self.file_offset + self.capacity as u64
    }
}

/// One rendered byte token from the physical view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteValue {
    pub text: String,
    /// Index within the viewport, not the file.
    pub offset: usize,
    pub value: u32,
}

/// Identifies one in-flight viewport fetch, so late responses can be told apart from current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub offset: u64,
}

/// Holds exactly one [`ViewportData`] snapshot, and renders or parses it.
#[derive(Debug, Default)]
pub struct ViewportDataStore {
    current: ViewportData,
    offset_max: u64,
    pending: Option<FetchTicket>,
    generation: u64,
}

impl ViewportDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, viewport: ViewportData) {
        self.offset_max = viewport.file_size();
        debug!(
            "Viewport set: offset {}, {} bytes ({} left), file size {}",
            viewport.file_offset(),
            viewport.len(),
            viewport.bytes_left(),
            self.offset_max
        );
        self.current = viewport;
    }

    pub fn get(&self) -> &ViewportData {
        &self.current
    }

    /// Best known total file size, as of the last [`Self::set`].
    pub fn offset_max(&self) -> u64 {
        self.offset_max
    }

    /// Starts a fetch for `offset`, superseding any fetch still in flight.
    pub fn begin_fetch(&mut self, offset: u64) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            offset,
        };
        self.pending = Some(ticket);
        ticket
    }

    /// `true` if `ticket` is the most recent fetch and hasn't been completed yet.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.pending == Some(ticket)
    }

    /// Accepts `viewport` only if `ticket` is the most recent fetch.
    ///
    /// Returns `false` (and drops the data) for stale responses.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, viewport: ViewportData) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale viewport for offset {} (generation {}, current {})",
                ticket.offset, ticket.generation, self.generation
            );
            return false;
        }
        self.pending = None;
        self.set(viewport);
        true
    }

    pub fn fetch_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn render_radix_text(&self, radix: Radix, bytes_per_row: usize) -> String {
        render_radix_text(self.current.data(), radix, bytes_per_row)
    }

    pub fn render_logical(&self, bytes_per_row: usize) -> String {
        logical_text_render(self.current.data(), bytes_per_row)
    }

    /// Tokenizes the current physical rendering back into byte values.
    pub fn extract_byte_values(&self, radix: Radix, bytes_per_row: usize) -> Vec<ByteValue> {
        extract_byte_values(&self.render_radix_text(radix, bytes_per_row), radix)
    }

    /// Borrowed view of `[from, to)`, relative to the viewport and clamped to its length.
    pub fn subarray(&self, from: usize, to: usize) -> &[u8] {
        let data = self.current.data();
        let to = to.min(data.len());
        let from = from.min(to);
        &data[from..to]
    }

    /// Owned copy of [`Self::subarray`].
    pub fn slice(&self, from: usize, to: usize) -> Vec<u8> {
        self.subarray(from, to).to_vec()
    }

    pub fn lower_fetch_boundary(&self) -> u64 {
        self.current.file_offset()
    }

    /// Scrolling past this file offset should trigger a fetch further into the file.
    pub fn upper_fetch_boundary(&self, bytes_per_row: usize, lines_displayed: usize) -> u64 {
        (self.current.file_offset() + self.current.len() as u64)
            .saturating_sub((lines_displayed * bytes_per_row) as u64)
    }

    /// Number of distinct top-line positions available within the current window.
    pub fn line_top_max(&self, bytes_per_row: usize, lines_displayed: usize) -> u64 {
        let vp_max_offset = self
            .current
            .len()
            .saturating_sub(lines_displayed * bytes_per_row) as u64;
        let file_offset = self.current.file_offset();
        offset_to_line_num(vp_max_offset + file_offset, file_offset, bytes_per_row) + 1
    }

    /// Parses user seek input in `address_radix`, bounded by the known file size.
    pub fn parse_seek_offset(&self, input: &str, address_radix: Radix) -> Result<u64, ViewportError> {
        if input.is_empty() {
            return Err(ViewportError::EmptySeekInput);
        }
        if !regex_edit_data_test(input, EditTarget::Radix(address_radix)) {
            return Err(ViewportError::InvalidSeekInput);
        }
        let offset = address_radix
            .parse(input)
            .ok_or(ViewportError::InvalidSeekInput)?;
        if offset > self.offset_max {
            return Err(ViewportError::SeekOutOfRange(offset));
        }
        Ok(offset)
    }
}

/// Row index of `offset` within a viewport starting at `viewport_start`.
pub fn offset_to_line_num(offset: u64, viewport_start: u64, bytes_per_row: usize) -> u64 {
    offset.saturating_sub(viewport_start) / bytes_per_row.max(1) as u64
}

/// Splits physical-view text into fixed-width byte tokens.
///
/// Token boundaries come from the radix's digit width rather than whitespace, so partially
/// edited text still lines up with byte positions.
pub fn extract_byte_values(text: &str, radix: Radix) -> Vec<ByteValue> {
    radix
        .token_regex()
        .find_iter(text)
        .enumerate()
        .filter_map(|(offset, token)| {
            let value = radix.parse(token.as_str())?;
            Some(ByteValue {
                text: token.as_str().to_owned(),
                offset,
                value: u32::try_from(value).ok()?,
            })
        })
        .collect()
}

