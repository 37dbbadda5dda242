//! Pure conversions between byte values and the text shown in each viewport column.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

mod encoding;
mod validate;

pub use encoding::{Encoding, bytes_to_encoded_string, encoded_string_to_bytes, is_encoded_text_editable};
pub use validate::{EditMode, EditTarget, regex_edit_data_test, valid_str_byte_len, validate_encoding_str};

#[cfg(test)]
mod tests;

/// Stand-in glyph for bytes with no printable Latin-1 form.
pub const UNPRINTABLE_CHAR_STAND_IN: char = '\u{2591}';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    #[error("value {0} is larger than an unsigned byte (255)")]
    ByteOutOfRange(u32),
    #[error("unsupported radix: {0}")]
    UnsupportedRadix(u32),
    #[error("unsupported encoding: \"{0}\"")]
    UnsupportedEncoding(String),
    #[error("invalid input")]
    InvalidInput,
    #[error("invalid edit length")]
    InvalidEditLength,
    #[error("character {0:?} can't be encoded as {1}")]
    UnencodableChar(char, Encoding),
}

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    int_enum::IntEnum,
    strum::Display,
    strum::VariantArray,
)]
#[repr(u8)]
pub enum Radix {
    Binary = 2,
    Octal = 8,
    Decimal = 10,
    #[default]
    Hexadecimal = 16,
}

static HEX_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-9a-fA-F]{2}").unwrap());
static DEC_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-9]{3}").unwrap());
static OCT_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-7]{3}").unwrap());
static BIN_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-1]{8}").unwrap());

/// Widest row any radix shows.
pub const MAX_BYTES_PER_ROW: usize = 16;

impl Radix {
    /// Radixes offered for the address column and seek input.
    pub const ADDRESS_VARIANTS: &'static [Radix] =
        &[Radix::Hexadecimal, Radix::Decimal, Radix::Octal];

    pub fn from_value(radix: u32) -> Result<Self, DisplayError> {
        u8::try_from(radix)
            .ok()
            .and_then(|r| Radix::try_from(r).ok())
            .ok_or(DisplayError::UnsupportedRadix(radix))
    }
    pub fn value(self) -> u32 {
        u8::from(self) as u32
    }
    /// Characters needed to show any byte in this radix.
    pub fn pad_width(self) -> usize {
        radix_pad_width(self.value())
    }
    pub fn short_name(self) -> &'static str {
        match self {
            Radix::Binary => "bin",
            Radix::Octal => "oct",
            Radix::Decimal => "dec",
            Radix::Hexadecimal => "hex",
        }
    }
    /// Bytes shown per row of the physical and logical views.
    pub fn bytes_per_row(self) -> usize {
        match self {
            Radix::Binary => 8,
            _ => MAX_BYTES_PER_ROW,
        }
    }
    pub fn is_address_radix(self) -> bool {
        Self::ADDRESS_VARIANTS.contains(&self)
    }
    /// Unpadded, lowercase representation of `value`.
    pub fn format(self, value: u64) -> String {
        match self {
            Radix::Binary => format!("{value:b}"),
            Radix::Octal => format!("{value:o}"),
            Radix::Decimal => format!("{value}"),
            Radix::Hexadecimal => format!("{value:x}"),
        }
    }
    /// `byte` zero-padded to [`Self::pad_width`].
    pub fn pad_byte(self, byte: u8) -> String {
        format!("{:0>width$}", self.format(byte as u64), width = self.pad_width())
    }
    pub fn parse(self, text: &str) -> Option<u64> {
        u64::from_str_radix(text, self.value()).ok()
    }
    /// Pattern matching exactly one rendered byte token.
    pub(crate) fn token_regex(self) -> &'static Regex {
        match self {
            Radix::Binary => &BIN_TOKEN,
            Radix::Octal => &OCT_TOKEN,
            Radix::Decimal => &DEC_TOKEN,
            Radix::Hexadecimal => &HEX_TOKEN,
        }
    }
}

/// Characters needed to show any byte in `radix`, or `0` for unsupported radices.
pub fn radix_pad_width(radix: u32) -> usize {
    match radix {
        2 => 8,
        8 => 3,
        10 => 3,
        16 => 2,
        _ => 0,
    }
}

/// Formats a single byte value, rejecting anything that doesn't fit in a `u8`.
pub fn byte_value_string(value: u32, radix: Radix) -> Result<String, DisplayError> {
    let byte = u8::try_from(value).map_err(|_| DisplayError::ByteOutOfRange(value))?;
    Ok(radix.pad_byte(byte))
}

/// Renders `bytes` as padded radix tokens, space separated, `bytes_per_row` to a line.
///
/// An empty slice renders as an empty string.
pub fn render_radix_text(bytes: &[u8], radix: Radix, bytes_per_row: usize) -> String {
    bytes
        .chunks(bytes_per_row.max(1))
        .map(|row| row.iter().map(|b| radix.pad_byte(*b)).join(" "))
        .join("\n")
}

/// `true` for code points with no printable Latin-1 glyph (C0 controls, DEL and C1 controls).
pub fn latin1_undefined(byte: u8) -> bool {
    byte < 32 || (127..160).contains(&byte)
}

/// Renders `bytes` as single Latin-1 characters laid out on the same rows as the radix view.
///
/// Unprintable bytes (newlines included) become [`UNPRINTABLE_CHAR_STAND_IN`], so every
/// byte takes exactly one column.
pub fn logical_text_render(bytes: &[u8], bytes_per_row: usize) -> String {
    bytes
        .chunks(bytes_per_row.max(1))
        .map(|row| {
            row.iter()
                .map(|&b| {
                    if latin1_undefined(b) {
                        UNPRINTABLE_CHAR_STAND_IN
                    } else {
                        b as char
                    }
                })
                .join(" ")
        })
        .join("\n")
}

/// One address per line, for lines `start..end` each `stride` bytes apart.
pub fn make_address_range(start: u64, end: u64, stride: u64, radix: Radix) -> String {
    (start..end).map(|line| radix.format(line * stride)).join("\n")
}
