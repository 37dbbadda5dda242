//! The byte-editing engine the viewer talks to, and an in-memory implementation of it.

use std::ops::Range;

use camino::{Utf8Path, Utf8PathBuf};
use memchr::memmem;
use tracing::{debug, info};

use crate::{
    viewport::{VIEWPORT_CAPACITY_MAX, ViewportData, ViewportError},
    windowing::Replacement,
};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("search pattern is empty")]
    EmptyPattern,
    #[error("viewport capacity {0} is over the maximum of {VIEWPORT_CAPACITY_MAX}")]
    CapacityTooLarge(usize),
    #[error(transparent)]
    Viewport(#[from] ViewportError),
}

/// Parameters of a search over `[offset, offset + length)`.
///
/// A `length` of `None` searches to the end of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub pattern: Vec<u8>,
    pub case_insensitive: bool,
    pub offset: u64,
    pub length: Option<u64>,
    /// Most matches to return.
    pub limit: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceRequest {
    pub pattern: Vec<u8>,
    pub replacement: Vec<u8>,
    pub case_insensitive: bool,
    pub offset: u64,
    pub length: Option<u64>,
}

/// Owner of the file's bytes.
///
/// Every call is a request/response, and results are plain data the caller
/// owns from then on.
pub trait EditingEngine {
    fn file_size(&self) -> u64;
    /// Bytes starting at `offset`, up to `capacity` of them.
    ///
    /// Offsets past the end of the file yield an empty viewport at the end of the file.
    fn fetch_viewport(&self, offset: u64, capacity: usize) -> Result<ViewportData, EngineError>;
    /// Ascending offsets of every non-overlapping match, at most `request.limit`.
    fn search(&self, request: &SearchRequest) -> Result<Vec<u64>, EngineError>;
    /// Replaces every non-overlapping match, in file order.
    ///
    /// Returned offsets are positions in the file after replacing.
    fn replace(&mut self, request: &ReplaceRequest) -> Result<Vec<Replacement>, EngineError>;
}

/// An engine holding the whole file in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    data: Vec<u8>,
    path: Option<Utf8PathBuf>,
}

impl MemoryEngine {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, path: None }
    }
    pub fn from_path(path: &Utf8Path) -> Result<Self, EngineError> {
        let data = fs_err::read(path)?;
        info!("Loaded {} bytes from {path}", data.len());
        Ok(Self {
            data,
            path: Some(path.to_owned()),
        })
    }
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn clamped_range(&self, offset: u64, length: Option<u64>) -> Range<usize> {
        let size = self.data.len() as u64;
        let start = offset.min(size);
        let end = length.map_or(size, |len| start.saturating_add(len).min(size));
        start as usize..end as usize
    }

    /// Absolute offsets of each match of `pattern` within `range`.
    fn matches(
        &self,
        pattern: &[u8],
        case_insensitive: bool,
        range: Range<usize>,
    ) -> Result<Vec<usize>, EngineError> {
        if pattern.is_empty() {
            return Err(EngineError::EmptyPattern);
        }
        let base = range.start;
        let haystack = &self.data[range];
        let found = if case_insensitive {
            let haystack = haystack.to_ascii_lowercase();
            let needle = pattern.to_ascii_lowercase();
            memmem::find_iter(&haystack, &needle).collect::<Vec<_>>()
        } else {
            memmem::find_iter(haystack, pattern).collect()
        };
        Ok(found.into_iter().map(|at| at + base).collect())
    }
}

impl EditingEngine for MemoryEngine {
    fn file_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn fetch_viewport(&self, offset: u64, capacity: usize) -> Result<ViewportData, EngineError> {
        if capacity > VIEWPORT_CAPACITY_MAX {
            return Err(EngineError::CapacityTooLarge(capacity));
        }
        let range = self.clamped_range(offset, Some(capacity as u64));
        let bytes_left = (self.data.len() - range.end) as u64;
        let file_offset = range.start as u64;
        let viewport = ViewportData::new(self.data[range].to_vec(), file_offset, bytes_left, capacity)?;
        Ok(viewport)
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<u64>, EngineError> {
        let range = self.clamped_range(request.offset, request.length);
        let offsets: Vec<u64> = self
            .matches(&request.pattern, request.case_insensitive, range)?
            .into_iter()
            .take(request.limit)
            .map(|at| at as u64)
            .collect();
        debug!(
            "Search for {} bytes found {} matches (limit {})",
            request.pattern.len(),
            offsets.len(),
            request.limit
        );
        Ok(offsets)
    }

    fn replace(&mut self, request: &ReplaceRequest) -> Result<Vec<Replacement>, EngineError> {
        let range = self.clamped_range(request.offset, request.length);
        let found = self.matches(&request.pattern, request.case_insensitive, range)?;
        if found.is_empty() {
            return Ok(Vec::new());
        }

        let mut output = Vec::with_capacity(self.data.len());
        let mut records = Vec::with_capacity(found.len());
        let mut copied_to = 0;
        for at in found {
            output.extend_from_slice(&self.data[copied_to..at]);
            records.push(Replacement {
                offset: output.len() as u64,
                byte_length: request.replacement.len(),
            });
            output.extend_from_slice(&request.replacement);
            copied_to = at + request.pattern.len();
        }
        output.extend_from_slice(&self.data[copied_to..]);

        info!(
            "Replaced {} matches, file size {} -> {}",
            records.len(),
            self.data.len(),
            output.len()
        );
        self.data = output;
        Ok(records)
    }
}
