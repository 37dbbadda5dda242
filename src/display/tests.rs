use super::*;
use strum::VariantArray;

#[test]
fn test_radix_pad_width() {
    for (radix, pad) in [(2, 8), (8, 3), (10, 3), (16, 2)] {
        assert_eq!(radix_pad_width(radix), pad);
        assert_eq!(Radix::from_value(radix).unwrap().pad_width(), pad);
    }
    assert_eq!(radix_pad_width(7), 0);
    assert_eq!(radix_pad_width(36), 0);
}

#[test]
fn test_unsupported_radix() {
    assert_eq!(Radix::from_value(3), Err(DisplayError::UnsupportedRadix(3)));
    assert_eq!(Radix::from_value(272), Err(DisplayError::UnsupportedRadix(272)));
}

#[test]
fn test_short_names() {
    assert_eq!(Radix::Binary.short_name(), "bin");
    assert_eq!(Radix::Octal.short_name(), "oct");
    assert_eq!(Radix::Decimal.short_name(), "dec");
    assert_eq!(Radix::Hexadecimal.short_name(), "hex");
}

#[test]
fn test_address_radixes() {
    assert!(!Radix::Binary.is_address_radix());
    for radix in [Radix::Octal, Radix::Decimal, Radix::Hexadecimal] {
        assert!(radix.is_address_radix(), "{radix:?}");
    }
    let widest = Radix::VARIANTS.iter().map(|r| r.bytes_per_row()).max();
    assert_eq!(widest, Some(MAX_BYTES_PER_ROW));
}

#[test]
fn test_byte_value_string() {
    assert_eq!(byte_value_string(0, Radix::Hexadecimal).unwrap(), "00");
    assert_eq!(byte_value_string(255, Radix::Hexadecimal).unwrap(), "ff");
    assert_eq!(byte_value_string(5, Radix::Binary).unwrap(), "00000101");
    assert_eq!(byte_value_string(8, Radix::Octal).unwrap(), "010");
    assert_eq!(byte_value_string(42, Radix::Decimal).unwrap(), "042");
    assert_eq!(
        byte_value_string(256, Radix::Decimal),
        Err(DisplayError::ByteOutOfRange(256))
    );
}

#[test]
fn test_render_empty() {
    for radix in [Radix::Binary, Radix::Octal, Radix::Decimal, Radix::Hexadecimal] {
        assert_eq!(render_radix_text(&[], radix, 16), "");
    }
    assert_eq!(logical_text_render(&[], 16), "");
}

#[test]
fn test_render_rows() {
    let bytes: Vec<u8> = (0..20).collect();
    let text = render_radix_text(&bytes, Radix::Hexadecimal, 8);
    assert_eq!(
        text,
        "00 01 02 03 04 05 06 07\n08 09 0a 0b 0c 0d 0e 0f\n10 11 12 13"
    );
    assert_eq!(
        render_radix_text(&[1, 255], Radix::Binary, 1),
        "00000001\n11111111"
    );
    assert_eq!(render_radix_text(&[9, 200], Radix::Decimal, 16), "009 200");
}

#[test]
fn test_logical_render() {
    assert_eq!(logical_text_render(&[65], 16), "A");
    assert_eq!(
        logical_text_render(&[7], 16),
        UNPRINTABLE_CHAR_STAND_IN.to_string()
    );
    assert_eq!(
        logical_text_render(b"Hi\nthere", 4),
        format!("H i {UNPRINTABLE_CHAR_STAND_IN} t\nh e r e")
    );
    // DEL and C1 controls are unprintable, the rest of Latin-1 isn't.
    let text = logical_text_render(&[126, 127, 159, 160, 233], 16);
    let glyph = UNPRINTABLE_CHAR_STAND_IN;
    assert_eq!(text, format!("~ {glyph} {glyph} \u{a0} \u{e9}"));
}

#[test]
fn test_logical_rows_match_radix_rows() {
    let bytes: Vec<u8> = (0..=255).collect();
    for per_row in [1, 7, 8, 16] {
        let logical = logical_text_render(&bytes, per_row);
        let physical = render_radix_text(&bytes, Radix::Hexadecimal, per_row);
        assert_eq!(logical.lines().count(), physical.lines().count());
    }
}

#[test]
fn test_address_range() {
    assert_eq!(make_address_range(0, 3, 16, Radix::Hexadecimal), "0\n10\n20");
    assert_eq!(make_address_range(2, 4, 8, Radix::Octal), "20\n30");
    assert_eq!(make_address_range(5, 5, 16, Radix::Decimal), "");
}

#[test]
fn test_encoding_names() {
    assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
    assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
    assert_eq!("utf-16".parse::<Encoding>().unwrap(), Encoding::Utf16Le);
    assert_eq!(Encoding::Utf16Le.to_string(), "utf-16le");
    assert_eq!(Encoding::Latin1.to_string(), "latin1");
    assert!("ebcdic".parse::<Encoding>().is_err());
}

#[test]
fn test_hex_and_binary_encoding() {
    let bytes = [0x00, 0x7F, 0xA5, 0xFF];
    assert_eq!(bytes_to_encoded_string(&bytes, Encoding::Hex), "007fa5ff");
    assert_eq!(
        encoded_string_to_bytes("007FA5ff", Encoding::Hex).unwrap(),
        bytes
    );
    assert_eq!(
        bytes_to_encoded_string(&[5, 128], Encoding::Binary),
        "0000010110000000"
    );
    assert_eq!(
        encoded_string_to_bytes("0000010110000000", Encoding::Binary).unwrap(),
        [5, 128]
    );
}

#[test]
fn test_fixed_width_decode_errors() {
    assert_eq!(
        encoded_string_to_bytes("abc", Encoding::Hex),
        Err(DisplayError::InvalidEditLength)
    );
    assert_eq!(
        encoded_string_to_bytes("zz", Encoding::Hex),
        Err(DisplayError::InvalidInput)
    );
    assert_eq!(
        encoded_string_to_bytes("0101", Encoding::Binary),
        Err(DisplayError::InvalidEditLength)
    );
    assert_eq!(
        encoded_string_to_bytes("01010102", Encoding::Binary),
        Err(DisplayError::InvalidInput)
    );
}

#[test]
fn test_text_encodings() {
    assert_eq!(
        encoded_string_to_bytes("caf\u{e9}", Encoding::Latin1).unwrap(),
        [b'c', b'a', b'f', 0xE9]
    );
    assert_eq!(
        bytes_to_encoded_string(&[b'c', b'a', b'f', 0xE9], Encoding::Latin1),
        "caf\u{e9}"
    );
    assert_eq!(
        encoded_string_to_bytes("caf\u{e9}", Encoding::Utf8).unwrap(),
        [b'c', b'a', b'f', 0xC3, 0xA9]
    );
    assert_eq!(
        encoded_string_to_bytes("A\u{20ac}", Encoding::Utf16Le).unwrap(),
        [0x41, 0x00, 0xAC, 0x20]
    );
    assert_eq!(
        bytes_to_encoded_string(&[0x41, 0x00, 0xAC, 0x20], Encoding::Utf16Le),
        "A\u{20ac}"
    );
    assert_eq!(bytes_to_encoded_string(&[0xC1], Encoding::Ascii), "A");
    assert_eq!(
        encoded_string_to_bytes("caf\u{e9}", Encoding::Ascii),
        Err(DisplayError::UnencodableChar('\u{e9}', Encoding::Ascii))
    );
    assert!(matches!(
        encoded_string_to_bytes("\u{20ac}", Encoding::Latin1),
        Err(DisplayError::UnencodableChar(_, Encoding::Latin1))
    ));
}

#[test]
fn test_edit_validation() {
    let hex = EditTarget::Radix(Radix::Hexadecimal);
    assert_eq!(validate_encoding_str("aF", hex, EditMode::Single), Ok(()));
    assert_eq!(
        validate_encoding_str("aF0", hex, EditMode::Single),
        Err(DisplayError::InvalidEditLength)
    );
    assert_eq!(
        validate_encoding_str("g0", hex, EditMode::Single),
        Err(DisplayError::InvalidInput)
    );
    assert_eq!(validate_encoding_str("aF01", hex, EditMode::Multiple), Ok(()));

    let octal = EditTarget::Radix(Radix::Octal);
    assert!(regex_edit_data_test("017", octal));
    assert!(!regex_edit_data_test("018", octal));

    let binary = EditTarget::Encoding(Encoding::Binary);
    assert_eq!(
        validate_encoding_str("0101", binary, EditMode::Multiple),
        Err(DisplayError::InvalidEditLength)
    );

    let latin1 = EditTarget::Encoding(Encoding::Latin1);
    assert_eq!(validate_encoding_str("\u{e9}", latin1, EditMode::Single), Ok(()));
    assert_eq!(
        validate_encoding_str("ab", latin1, EditMode::Single),
        Err(DisplayError::InvalidEditLength)
    );
    assert_eq!(
        validate_encoding_str("\u{20ac}", latin1, EditMode::Multiple),
        Err(DisplayError::InvalidInput)
    );
    assert!(is_encoded_text_editable("plain", Encoding::Ascii));
    assert!(!is_encoded_text_editable("\u{1F600}", Encoding::Utf8));
}
