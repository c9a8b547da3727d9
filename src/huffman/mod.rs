//! Static canonical Huffman coding over bytes.
//!
//! The pipeline is `Histogram -> HuffmanTree -> DepthMap -> Vec<Triplet> -> CodeTable`.
//! Only the `(symbol, length)` pairs of the depth map travel in the container; the
//! decoder rebuilds the exact same codes from them with [`canonical_codes`].

pub mod histogram;
pub mod tree;
pub mod canonical;

pub use canonical::{canonical_codes, CodeTable, Codeword, DepthMap, Triplet};
pub use histogram::Histogram;
pub use tree::{HuffmanTree, Node};

pub const NUM_SYMBOLS: usize = 256;
/// Longest code the bit writer can emit in one call.
pub const MAX_CODE_LEN: u8 = 64;

#[cfg(test)]
mod tests;
