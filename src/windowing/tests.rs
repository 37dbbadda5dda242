use rand::Rng;

use super::*;

const HITS: [u64; 4] = [5, 20, 100, 4096];

#[test]
fn test_window_examples() {
    let window = window_results(&HITS, 0, 1024);
    assert_eq!(window.data, &[5, 20, 100]);
    assert_eq!(window.start, 0);
    assert_eq!(window.end, Some(3));

    let window = window_results(&HITS, 4096, 1024);
    assert_eq!(window.data, &[4096]);
    assert_eq!(window.end, None);

    let window = window_results(&HITS, 5000, 1024);
    assert!(window.is_empty());
}

#[test]
fn test_window_edges() {
    // Start is inclusive, end is exclusive.
    assert_eq!(window_results(&HITS, 20, 80).data, &[20]);
    assert_eq!(window_results(&HITS, 20, 81).data, &[20, 100]);
    assert_eq!(window_results(&HITS, 6, 14).data, &[] as &[u64]);
    assert_eq!(window_results(&HITS, 0, 0).data, &[] as &[u64]);
}

#[test]
fn test_window_empty_list() {
    let empty: [u64; 0] = [];
    for offset in [0, 1, u64::MAX] {
        let window = window_results(&empty, offset, 1024);
        assert!(window.is_empty());
        assert_eq!(window.range(), 0..0);
    }
}

#[test]
fn test_window_near_max_offset() {
    let hits = [u64::MAX - 1];
    assert_eq!(window_results(&hits, u64::MAX - 10, 1024).data, &hits);
}

#[test]
fn test_window_display() {
    assert_eq!(window_results(&HITS, 0, 1024).to_string(), "0..3");
    assert_eq!(window_results(&HITS, 100, 8192).to_string(), "2..");
}

#[test]
fn test_window_matches_filter() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let count = rng.random_range(0..64);
        let mut list: Vec<u64> = (0..count).map(|_| rng.random_range(0..10_000)).collect();
        list.sort_unstable();

        let offset = rng.random_range(0..11_000);
        let capacity = rng.random_range(0..3_000);
        let window = window_results(&list, offset, capacity);

        let expected: Vec<u64> = list
            .iter()
            .copied()
            .filter(|x| *x >= offset && *x < offset + capacity as u64)
            .collect();
        assert_eq!(window.data, expected, "{list:?} @ {offset}+{capacity}");
        assert_eq!(&list[window.range()], window.data);
    }
}

#[test]
fn test_window_replacements() {
    let results = ReplaceResults::new(vec![
        Replacement {
            offset: 3,
            byte_length: 2,
        },
        Replacement {
            offset: 1030,
            byte_length: 4,
        },
    ]);
    let window = results.window(1024, 1024);
    assert_eq!(window.len(), 1);
    assert_eq!(window.data[0].offset, 1030);
    assert_eq!(window.start, 1);
}

#[test]
fn test_search_overflow() {
    let results = SearchResults::from_engine(vec![1, 2, 3, 4], 2, 3);
    assert!(results.overflow());
    assert_eq!(results.offsets(), &[1, 2, 3]);

    let results = SearchResults::from_engine(vec![1, 2, 3], 2, 3);
    assert!(!results.overflow());
    assert_eq!(results.len(), 3);
}

#[test]
fn test_search_cursor_wraps() {
    let mut results = SearchResults::from_engine(vec![10, 20, 30], 1, 100);
    assert_eq!(results.current(), Some(10));
    assert_eq!(results.select_prev(), Some(30));
    assert_eq!(results.select_next(), Some(10));
    assert_eq!(results.select_next(), Some(20));
    assert_eq!(results.select(-4), Some(30));
    assert_eq!(results.select(7), Some(20));
    assert_eq!(results.index(), 1);

    results.clear();
    assert!(results.is_empty());
    assert_eq!(results.select_next(), None);
    assert_eq!(results.current(), None);
}
