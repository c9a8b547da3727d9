use std::collections::HashMap;

use crate::error::{Error, FormatError, Result};

use super::{Histogram, HuffmanTree, MAX_CODE_LEN, NUM_SYMBOLS};

/// `(code_length, symbol)` pairs, one per symbol present in the input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepthMap {
    entries: Vec<(u8, u8)>,
}

impl DepthMap {
    pub fn new(entries: Vec<(u8, u8)>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, code_len: u8, symbol: u8) {
        self.entries.push((code_len, symbol));
    }

    /// Orders entries by ascending `(code_length, symbol)`.
    pub fn sort(&mut self) {
        self.entries.sort();
    }

    pub fn entries(&self) -> &[(u8, u8)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One canonical code assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triplet {
    pub symbol: u8,
    pub code: u64,
    pub code_len: u8,
}

/// The bits the encoder emits for one symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Codeword {
    pub code: u64,
    pub len: u8,
}

/// Assigns canonical codes in ascending `(length, symbol)` order.
///
/// The first code is 0; each next code is the previous plus one, shifted left by the
/// growth in length whenever the length grows. The input order does not matter.
pub fn canonical_codes(depth_map: &DepthMap) -> Result<Vec<Triplet>> {
    let mut sorted = depth_map.clone();
    sorted.sort();

    let mut seen = [false; NUM_SYMBOLS];
    let mut codes = Vec::with_capacity(sorted.len());
    let mut prev: Option<(u128, u8)> = None;

    for &(code_len, symbol) in sorted.entries() {
        if code_len == 0 {
            return Err(FormatError::InvalidCodeLength { symbol, length: code_len }.into());
        }
        if code_len > MAX_CODE_LEN {
            return Err(Error::CodeTooLong { symbol, length: code_len as u32 });
        }
        if seen[symbol as usize] {
            return Err(FormatError::DuplicateSymbol(symbol).into());
        }
        seen[symbol as usize] = true;

        let code = match prev {
            None => 0,
            Some((prev_code, prev_len)) => (prev_code + 1) << (code_len - prev_len),
        };

        if code >> code_len != 0 {
            return Err(FormatError::OversubscribedTable.into());
        }

        codes.push(Triplet { symbol, code: code as u64, code_len });
        prev = Some((code, code_len));
    }

    Ok(codes)
}

/// Encode and decode views over one set of canonical codes.
///
/// Decoding is keyed by `(code, length)`: `0b1` of length 2 and `0b1` of length 3 are
/// different codes even though their values match.
#[derive(Clone, Debug)]
pub struct CodeTable {
    forward: [Option<Codeword>; NUM_SYMBOLS],
    reverse: HashMap<(u64, u8), u8>,
    triplets: Vec<Triplet>,
    min_len: u8,
    max_len: u8,
}

impl Default for CodeTable {
    fn default() -> Self {
        Self {
            forward: [None; NUM_SYMBOLS],
            reverse: HashMap::new(),
            triplets: Vec::new(),
            min_len: 0,
            max_len: 0,
        }
    }
}

impl CodeTable {
    /// Builds the tree, derives the depth map and assigns canonical codes.
    pub fn from_histogram(histo: &Histogram) -> Result<Self> {
        let tree = HuffmanTree::build(histo)?;
        Self::from_depth_map(&tree.into_depth_map())
    }

    pub fn from_depth_map(depth_map: &DepthMap) -> Result<Self> {
        let triplets = canonical_codes(depth_map)?;

        let mut table = Self::default();
        for t in triplets.iter() {
            let codeword = Codeword { code: t.code, len: t.code_len };
            table.forward[t.symbol as usize] = Some(codeword);
            table.reverse.insert((t.code, t.code_len), t.symbol);
        }

        table.min_len = triplets.first().map_or(0, |t| t.code_len);
        table.max_len = triplets.last().map_or(0, |t| t.code_len);
        table.triplets = triplets;

        Ok(table)
    }

    #[inline(always)]
    pub fn codeword(&self, symbol: u8) -> Option<Codeword> {
        self.forward[symbol as usize]
    }

    #[inline(always)]
    pub fn symbol(&self, code: u64, len: u8) -> Option<u8> {
        self.reverse.get(&(code, len)).copied()
    }

    /// Codes in canonical order.
    pub fn triplets(&self) -> &[Triplet] {
        &self.triplets
    }

    /// The `(length, symbol)` pairs in canonical order, as the header stores them.
    pub fn depth_map(&self) -> DepthMap {
        DepthMap::new(self.triplets.iter().map(|t| (t.code_len, t.symbol)).collect())
    }

    pub fn min_len(&self) -> u8 {
        self.min_len
    }

    pub fn max_len(&self) -> u8 {
        self.max_len
    }

    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Average bits per symbol this table spends on the given distribution.
    pub fn average_len(&self, histo: &Histogram) -> f64 {
        let total = histo.total();
        if total == 0 {
            return 0.0;
        }

        let bits: u64 = histo
            .present()
            .filter_map(|(s, c)| self.codeword(s).map(|cw| c * cw.len as u64))
            .sum();

        bits as f64 / total as f64
    }
}
