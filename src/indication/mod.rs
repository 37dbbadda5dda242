//! Bit-packed byte indications.
//!
//! Every byte position shown in a viewport has one auxiliary "overlay" byte next to it.
//! The 8 bits of that overlay byte are shared between [`Category`]s, each of which
//! holds a small set of mutually exclusive [`Indicator`]s (e.g. `selected`, `searchresult`).
//!
//! The value stored in a category's field is the index of the active indicator within
//! that category, with `0` always being "none".
//!
//! Layouts are owned by an explicitly constructed [`IndicationRegistry`], which callers
//! build once at startup (see [`IndicationRegistry::viewport_default`]) and share.

mod category;
mod registry;

pub use category::{Category, Indicator, NO_INDICATOR};
pub use registry::IndicationRegistry;


/// Name of the category holding the user's selection.
pub const CATEGORY_SELECTION: &str = "one";
/// Name of the category holding search and replace results.
pub const CATEGORY_QUERY: &str = "two";
/// Name of the category holding the debugger's current position.
pub const CATEGORY_DEBUGGER: &str = "debugger";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicationError {
    #[error("category \"{name}\" needs {requested} bits, but only {available} of 8 are left")]
    CapacityExceeded {
        name: String,
        requested: u8,
        available: u8,
    },
    #[error("category bit width must be within 1..=8, got {0}")]
    InvalidBitWidth(u8),
    #[error("indicator \"{0}\" is already registered")]
    DuplicateIndicator(String),
    #[error("category \"{0}\" is already registered")]
    DuplicateCategory(String),
    #[error("category \"{name}\" can't fit more than {max} indicators in {bit_width} bits")]
    IndicatorOverflow {
        name: String,
        bit_width: u8,
        max: usize,
    },
    #[error(
        "indicator \"{indicator}\" of category \"{category}\" doesn't fit in a byte at bit {offset}"
    )]
    FieldOverflow {
        category: String,
        indicator: String,
        offset: u32,
    },
    #[error("no category contains an indicator named \"{0}\"")]
    NotFound(String),
    #[error("no category named \"{0}\" is registered")]
    UnknownCategory(String),
}

/// The indicators used by the viewport overlay.
///
/// Registry operations take any `AsRef<str>`, so these can be passed directly
/// instead of spelling out indicator names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ViewportIndicator {
    Selected,
    SearchResult,
    Replacement,
    #[strum(serialize = "bytepos1b")]
    BytePos1b,
}
