use std::sync::LazyLock;

use regex::Regex;

use super::{DisplayError, Encoding, Radix, encoding::is_encoded_text_editable};

static BINARY_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[0-1]*$").unwrap());
static OCTAL_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[0-7]*$").unwrap());
static DECIMAL_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[0-9]*$").unwrap());
static HEX_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[0-9a-fA-F]*$").unwrap());

/// Whether an edit replaces exactly one byte, or an arbitrary run of them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum EditMode {
    #[default]
    Single,
    Multiple,
}

/// What edited text is being interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Digits typed into the physical (radix) view.
    Radix(Radix),
    /// Text typed into the multi-byte editor.
    Encoding(Encoding),
}

impl EditTarget {
    /// The fixed-width digit radix of this target, or the plain text encoding if it has none.
    fn digits(self) -> Result<Radix, Encoding> {
        match self {
            EditTarget::Radix(radix) => Ok(radix),
            EditTarget::Encoding(encoding) => encoding.radix().ok_or(encoding),
        }
    }
}

/// Checks that `text` only holds characters valid for `target`.
pub fn regex_edit_data_test(text: &str, target: EditTarget) -> bool {
    match target.digits() {
        Ok(Radix::Binary) => BINARY_DIGITS.is_match(text),
        Ok(Radix::Octal) => OCTAL_DIGITS.is_match(text),
        Ok(Radix::Decimal) => DECIMAL_DIGITS.is_match(text),
        Ok(Radix::Hexadecimal) => HEX_DIGITS.is_match(text),
        Err(encoding) => is_encoded_text_editable(text, encoding),
    }
}

/// Checks that `text` is a whole number of bytes for `target`.
///
/// Single-byte edits must be exactly one byte wide.
pub fn valid_str_byte_len(text: &str, target: EditTarget, mode: EditMode) -> bool {
    match target.digits() {
        Ok(radix) => {
            let width = radix.pad_width();
            match mode {
                EditMode::Single => text.len() == width,
                EditMode::Multiple => text.len() % width == 0,
            }
        }
        Err(_) => match mode {
            EditMode::Single => text.chars().count() == 1,
            EditMode::Multiple => true,
        },
    }
}

pub fn validate_encoding_str(
    text: &str,
    target: EditTarget,
    mode: EditMode,
) -> Result<(), DisplayError> {
    if !regex_edit_data_test(text, target) {
        return Err(DisplayError::InvalidInput);
    }
    if !valid_str_byte_len(text, target, mode) {
        return Err(DisplayError::InvalidEditLength);
    }
    Ok(())
}
