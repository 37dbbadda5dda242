use rand::Rng;

use super::*;

const RADIXES: [Radix; 4] = [
    Radix::Binary,
    Radix::Octal,
    Radix::Decimal,
    Radix::Hexadecimal,
];

fn store_with(data: Vec<u8>, file_offset: u64, bytes_left: u64) -> ViewportDataStore {
    let capacity = data.len().max(DEFAULT_VIEWPORT_CAPACITY);
    let mut store = ViewportDataStore::new();
    store.set(ViewportData::new(data, file_offset, bytes_left, capacity).unwrap());
    store
}

#[test]
fn test_capacity_enforced() {
    assert_eq!(
        ViewportData::new(vec![0; 17], 0, 0, 16),
        Err(ViewportError::CapacityExceeded {
            length: 17,
            capacity: 16
        })
    );
    assert!(ViewportData::new(vec![0; 16], 0, 0, 16).is_ok());
    assert!(ViewportData::new(Vec::new(), 0, 0, 0).is_ok());
}

#[test]
fn test_offset_max() {
    let store = store_with(vec![1, 2, 3, 4], 100, 50);
    assert_eq!(store.offset_max(), 154);
    assert_eq!(store.get().file_size(), 154);
    assert_eq!(store.get().len(), 4);
}

#[test]
fn test_offset_max_follows_edits() {
    let mut store = store_with(vec![0; 16], 0, 16);
    assert_eq!(store.offset_max(), 32);
    // Engine reports a shorter file after a deletion
    store.set(ViewportData::new(vec![0; 10], 0, 0, 1024).unwrap());
    assert_eq!(store.offset_max(), 10);
}

#[test]
fn test_empty_store_renders_nothing() {
    let store = ViewportDataStore::new();
    assert_eq!(store.render_radix_text(Radix::Hexadecimal, 16), "");
    assert_eq!(store.render_logical(16), "");
    assert!(store.extract_byte_values(Radix::Hexadecimal, 16).is_empty());
    assert_eq!(store.offset_max(), 0);
}

#[test]
fn test_extract_byte_values() {
    let store = store_with(vec![0x00, 0xAB, 0x10], 4096, 0);
    let values = store.extract_byte_values(Radix::Hexadecimal, 2);
    assert_eq!(
        values,
        vec![
            ByteValue {
                text: "00".into(),
                offset: 0,
                value: 0
            },
            ByteValue {
                text: "ab".into(),
                offset: 1,
                value: 0xAB
            },
            ByteValue {
                text: "10".into(),
                offset: 2,
                value: 0x10
            },
        ]
    );
}

#[test]
fn test_extract_from_edited_text() {
    // The user typed over the second token and left the separators alone.
    let values = extract_byte_values("00 FF 7f", Radix::Hexadecimal);
    let parsed: Vec<u32> = values.iter().map(|v| v.value).collect();
    assert_eq!(parsed, [0x00, 0xFF, 0x7F]);
    assert_eq!(values[1].text, "FF");

    let values = extract_byte_values("999 001", Radix::Decimal);
    assert_eq!(values[0].value, 999);
    assert_eq!(values[1].offset, 1);
}

#[test]
fn test_round_trip_all_radixes() {
    let mut rng = rand::rng();
    for _ in 0..50 {
        let len = rng.random_range(0..300);
        let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        let per_row = rng.random_range(1..40);
        let store = store_with(data.clone(), 0, 0);
        for radix in RADIXES {
            let values: Vec<u8> = store
                .extract_byte_values(radix, per_row)
                .into_iter()
                .map(|v| v.value as u8)
                .collect();
            assert_eq!(values, data, "radix {radix}, {per_row} per row");
        }
    }
}

#[test]
fn test_round_trip_every_byte() {
    let data: Vec<u8> = (0..=255).collect();
    let store = store_with(data.clone(), 0, 0);
    for radix in RADIXES {
        for per_row in [1, 8, 16] {
            let values: Vec<u32> = store
                .extract_byte_values(radix, per_row)
                .iter()
                .map(|v| v.value)
                .collect();
            let expected: Vec<u32> = data.iter().map(|b| *b as u32).collect();
            assert_eq!(values, expected);
        }
    }
}

#[test]
fn test_subarray_and_slice() {
    let store = store_with(vec![10, 11, 12, 13, 14], 1000, 0);
    assert_eq!(store.subarray(1, 3), &[11, 12]);
    assert_eq!(store.slice(3, 100), vec![13, 14]);
    assert_eq!(store.subarray(4, 2), &[] as &[u8]);
    assert!(store.slice(9, 12).is_empty());
}

#[test]
fn test_fetch_boundaries() {
    let store = store_with(vec![0; 1024], 2048, 4096);
    assert_eq!(store.lower_fetch_boundary(), 2048);
    assert_eq!(store.upper_fetch_boundary(16, 20), 2048 + 1024 - 320);
    assert_eq!(store.line_top_max(16, 20), (1024 - 320) / 16 + 1);

    let short = store_with(vec![0; 32], 0, 0);
    assert_eq!(short.upper_fetch_boundary(16, 20), 0);
    assert_eq!(short.line_top_max(16, 20), 1);
}

#[test]
fn test_offset_to_line_num() {
    assert_eq!(offset_to_line_num(0, 0, 16), 0);
    assert_eq!(offset_to_line_num(47, 16, 16), 1);
    assert_eq!(offset_to_line_num(48, 16, 16), 2);
    assert_eq!(offset_to_line_num(5, 16, 16), 0);
}

#[test]
fn test_stale_fetch_discarded() {
    let mut store = ViewportDataStore::new();
    let first = store.begin_fetch(0);
    let second = store.begin_fetch(1024);
    assert!(store.fetch_pending());
    assert!(!store.is_current(first));
    assert!(store.is_current(second));

    let late = ViewportData::new(vec![1; 16], 0, 100, 1024).unwrap();
    assert!(!store.complete_fetch(first, late));
    assert_eq!(store.get().len(), 0);

    let current = ViewportData::new(vec![2; 16], 1024, 0, 1024).unwrap();
    assert!(store.complete_fetch(second, current));
    assert_eq!(store.get().file_offset(), 1024);
    assert!(!store.fetch_pending());
    assert!(!store.is_current(second));

    // A ticket can only be redeemed once.
    let again = ViewportData::new(vec![3; 16], 1024, 0, 1024).unwrap();
    assert!(!store.complete_fetch(second, again));
    assert_eq!(store.get().data()[0], 2);
}

#[test]
fn test_parse_seek_offset() {
    let store = store_with(vec![0; 16], 0, 240);
    assert_eq!(store.parse_seek_offset("ff", Radix::Hexadecimal), Ok(255));
    assert_eq!(store.parse_seek_offset("100", Radix::Hexadecimal), Ok(256));
    assert_eq!(
        store.parse_seek_offset("101", Radix::Hexadecimal),
        Err(ViewportError::SeekOutOfRange(257))
    );
    assert_eq!(
        store.parse_seek_offset("0x10", Radix::Hexadecimal),
        Err(ViewportError::InvalidSeekInput)
    );
    assert_eq!(
        store.parse_seek_offset("19", Radix::Octal),
        Err(ViewportError::InvalidSeekInput)
    );
    assert_eq!(
        store.parse_seek_offset("", Radix::Decimal),
        Err(ViewportError::EmptySeekInput)
    );
    assert_eq!(
        ViewportError::SeekOutOfRange(1).to_string(),
        "Exceeds filesize"
    );
}
