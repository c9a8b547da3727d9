use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Error, FormatError};

use super::{canonical_codes, CodeTable, Codeword, DepthMap, Histogram, HuffmanTree, Node, Triplet};

fn random_bytes(seed: u64, len: usize, alphabet: u8) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Squaring a uniform sample skews the distribution towards small symbols.
    (0..len)
        .map(|_| {
            let x: f64 = rng.gen();
            (x * x * alphabet as f64) as u8
        })
        .collect()
}

#[test]
fn test_histogram_counts() {
    let histo = Histogram::accumulate(b"aaaabbbc");

    assert_eq!(histo.count(b'a'), 4);
    assert_eq!(histo.count(b'b'), 3);
    assert_eq!(histo.count(b'c'), 1);
    assert_eq!(histo.count(b'd'), 0);
    assert_eq!(histo.total(), 8);
    assert_eq!(histo.distinct(), 3);
}

#[test]
fn test_histogram_merge_any_split() {
    let data = random_bytes(7, 2_000, 255);
    let whole = Histogram::accumulate(&data);

    for split in [0, 1, 17, 999, 1_999, 2_000] {
        let (left, right) = data.split_at(split);
        let l = Histogram::accumulate(left);
        let r = Histogram::accumulate(right);

        assert_eq!(l.clone().merge(r.clone()), whole);
        assert_eq!(r.merge(l), whole);
    }
}

#[test]
fn test_histogram_entropy() {
    assert_eq!(Histogram::new().entropy(), 0.0);
    assert_eq!(Histogram::accumulate(&[9; 100]).entropy(), 0.0);
    assert!((Histogram::accumulate(b"abab").entropy() - 1.0).abs() < 1e-12);
    assert!((Histogram::accumulate(b"abcd").entropy() - 2.0).abs() < 1e-12);
}

#[test]
fn test_tree_rejects_empty_histogram() {
    assert!(matches!(
        HuffmanTree::build(&Histogram::new()),
        Err(Error::DegenerateInput { distinct_symbols: 0 })
    ));
}

#[test]
fn test_tree_shape() {
    let tree = HuffmanTree::build(&Histogram::accumulate(b"aaaabbbc")).unwrap();

    // c and b merge first (4), then a joins at the root.
    let Node::Internal { occurrence, left, right } = tree.root() else {
        panic!("root must be internal");
    };
    assert_eq!(*occurrence, 8);
    assert_eq!(**left, Node::Leaf { symbol: b'a', occurrence: 4 });
    assert_eq!(right.occurrence(), 4);
    assert!(!right.is_leaf());
}

#[test]
fn test_depth_map_example() {
    let tree = HuffmanTree::build(&Histogram::accumulate(b"aaaabbbc")).unwrap();
    let mut depth_map = tree.into_depth_map();
    depth_map.sort();

    assert_eq!(depth_map.entries(), &[(1, b'a'), (2, b'b'), (2, b'c')]);
}

#[test]
fn test_single_symbol_gets_length_one() {
    let tree = HuffmanTree::build(&Histogram::accumulate(&[0x41; 10_000])).unwrap();
    assert!(tree.root().is_leaf());

    let depth_map = tree.into_depth_map();
    assert_eq!(depth_map.entries(), &[(1, 0x41)]);

    let table = CodeTable::from_depth_map(&depth_map).unwrap();
    assert_eq!(table.codeword(0x41), Some(Codeword { code: 0, len: 1 }));
}

#[test]
fn test_canonical_assignment() {
    let depth_map = DepthMap::new(vec![(3, b'd'), (1, b'a'), (3, b'c'), (2, b'b')]);

    let codes = canonical_codes(&depth_map).unwrap();

    assert_eq!(
        codes,
        vec![
            Triplet { symbol: b'a', code: 0b0, code_len: 1 },
            Triplet { symbol: b'b', code: 0b10, code_len: 2 },
            Triplet { symbol: b'c', code: 0b110, code_len: 3 },
            Triplet { symbol: b'd', code: 0b111, code_len: 3 },
        ]
    );
}

#[test]
fn test_canonical_codes_ignore_input_order() {
    let entries = vec![(4, 9), (2, 1), (3, 200), (4, 3), (2, 0), (3, 7), (4, 8), (4, 2)];
    let expected = canonical_codes(&DepthMap::new(entries.clone())).unwrap();

    let mut reversed = entries.clone();
    reversed.reverse();
    assert_eq!(canonical_codes(&DepthMap::new(reversed)).unwrap(), expected);

    let mut rotated = entries;
    rotated.rotate_left(3);
    assert_eq!(canonical_codes(&DepthMap::new(rotated)).unwrap(), expected);
}

#[test]
fn test_canonical_rejects_bad_tables() {
    assert!(matches!(
        canonical_codes(&DepthMap::new(vec![(0, 1)])),
        Err(Error::Format(FormatError::InvalidCodeLength { symbol: 1, length: 0 }))
    ));
    assert!(matches!(
        canonical_codes(&DepthMap::new(vec![(1, 1), (1, 1)])),
        Err(Error::Format(FormatError::DuplicateSymbol(1)))
    ));
    assert!(matches!(
        canonical_codes(&DepthMap::new(vec![(1, 1), (1, 2), (1, 3)])),
        Err(Error::Format(FormatError::OversubscribedTable))
    ));
    assert!(matches!(
        canonical_codes(&DepthMap::new(vec![(65, 1)])),
        Err(Error::CodeTooLong { symbol: 1, length: 65 })
    ));
}

#[test]
fn test_code_table_views_agree() {
    let histo = Histogram::accumulate(&random_bytes(3, 50_000, 200));
    let table = CodeTable::from_histogram(&histo).unwrap();

    assert_eq!(table.len(), histo.distinct());
    for (symbol, _) in histo.present() {
        let cw = table.codeword(symbol).unwrap();
        assert_eq!(table.symbol(cw.code, cw.len), Some(symbol));
    }
    assert_eq!(table.codeword(255), None);
}

#[test]
fn test_code_table_is_prefix_free() {
    let histo = Histogram::accumulate(&random_bytes(11, 20_000, 255));
    let table = CodeTable::from_histogram(&histo).unwrap();
    let codes = table.triplets();

    for a in codes {
        for b in codes {
            if a.symbol == b.symbol || a.code_len > b.code_len {
                continue;
            }
            let prefix = b.code >> (b.code_len - a.code_len);
            assert_ne!(prefix, a.code, "{:?} is a prefix of {:?}", a, b);
        }
    }
}

#[test]
fn test_code_lengths_track_frequency() {
    let histo = Histogram::accumulate(&random_bytes(5, 100_000, 64));
    let table = CodeTable::from_histogram(&histo).unwrap();

    let mut present: Vec<_> = histo.present().collect();
    present.sort_by_key(|&(_, c)| std::cmp::Reverse(c));

    let most = table.codeword(present[0].0).unwrap().len;
    let least = table.codeword(present[present.len() - 1].0).unwrap().len;
    assert!(most <= least);
    assert_eq!(most, table.min_len());
}

#[test]
fn test_average_len_close_to_entropy() {
    let histo = Histogram::accumulate(&random_bytes(13, 100_000, 128));
    let table = CodeTable::from_histogram(&histo).unwrap();

    let entropy = histo.entropy();
    let average = table.average_len(&histo);

    assert!(average >= entropy);
    assert!(average < entropy + 1.0);
}

#[test]
fn test_every_byte_value() {
    let data: Vec<u8> = (0..=255).collect();
    let table = CodeTable::from_histogram(&Histogram::accumulate(&data)).unwrap();

    assert_eq!(table.len(), 256);
    assert!(table.triplets().iter().all(|t| t.code_len == 8));
    assert_eq!(table.depth_map().len(), 256);
}
