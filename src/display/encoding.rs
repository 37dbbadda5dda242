use bstr::ByteSlice;
use itertools::Itertools;

use super::{DisplayError, Radix};

/// Text encodings the editor can show or accept edits in.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[strum(ascii_case_insensitive)]
pub enum Encoding {
    #[strum(serialize = "hex")]
    Hex,
    #[strum(serialize = "binary")]
    Binary,
    #[strum(serialize = "ascii")]
    Ascii,
    #[default]
    #[strum(serialize = "latin1")]
    Latin1,
    #[strum(to_string = "utf-8", serialize = "utf8")]
    Utf8,
    #[strum(to_string = "utf-16le", serialize = "utf-16", serialize = "utf16le")]
    Utf16Le,
}

impl Encoding {
    /// The radix whose fixed-width digits this encoding uses, if any.
    pub fn radix(self) -> Option<Radix> {
        match self {
            Encoding::Hex => Some(Radix::Hexadecimal),
            Encoding::Binary => Some(Radix::Binary),
            _ => None,
        }
    }
}

pub fn bytes_to_encoded_string(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Hex => hex::encode(bytes),
        Encoding::Binary => bytes.iter().map(|b| Radix::Binary.pad_byte(*b)).join(""),
        Encoding::Ascii => bytes.iter().map(|b| (b & 0x7F) as char).collect(),
        Encoding::Latin1 => bytes.iter().map(|b| *b as char).collect(),
        Encoding::Utf8 => bytes.to_str_lossy().into_owned(),
        Encoding::Utf16Le => {
            let units = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
    }
}

/// Inverse of [`bytes_to_encoded_string`].
///
/// `hex` and `binary` are read in fixed-width chunks (2 and 8 digits per byte).
pub fn encoded_string_to_bytes(text: &str, encoding: Encoding) -> Result<Vec<u8>, DisplayError> {
    match encoding {
        Encoding::Hex => hex::decode(text).map_err(|e| match e {
            hex::FromHexError::OddLength => DisplayError::InvalidEditLength,
            _ => DisplayError::InvalidInput,
        }),
        Encoding::Binary => {
            let width = Radix::Binary.pad_width();
            if text.len() % width != 0 {
                return Err(DisplayError::InvalidEditLength);
            }
            text.as_bytes()
                .chunks(width)
                .map(|chunk| {
                    std::str::from_utf8(chunk)
                        .ok()
                        .and_then(|digits| u8::from_str_radix(digits, 2).ok())
                        .ok_or(DisplayError::InvalidInput)
                })
                .collect()
        }
        Encoding::Ascii => single_byte_chars(text, 0x7F, encoding),
        Encoding::Latin1 => single_byte_chars(text, 0xFF, encoding),
        Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
        Encoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
    }
}

fn single_byte_chars(text: &str, max: u32, encoding: Encoding) -> Result<Vec<u8>, DisplayError> {
    text.chars()
        .map(|c| {
            if c as u32 <= max {
                Ok(c as u8)
            } else {
                Err(DisplayError::UnencodableChar(c, encoding))
            }
        })
        .collect()
}

/// Whether every character of `text` can be represented in `encoding`.
pub fn is_encoded_text_editable(text: &str, encoding: Encoding) -> bool {
    match encoding {
        Encoding::Latin1 => text.chars().all(|c| c as u32 <= 0xFF),
        Encoding::Ascii => text.is_ascii(),
        Encoding::Utf8 | Encoding::Utf16Le => text.chars().all(|c| c as u32 <= 0xFFFF),
        Encoding::Hex | Encoding::Binary => true,
    }
}
