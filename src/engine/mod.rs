//! Chunked compression and decompression of whole files.

pub mod plan;
pub mod strategy;
pub mod compressor;
pub mod decompressor;

use std::io::Cursor;

pub use compressor::{CompressionReport, Compressor, LOOKUP_EXPANSION};
pub use decompressor::{DecompressionReport, Decompressor, StreamDecoder};
pub use plan::ChunkPlan;
pub use strategy::{EncodeStrategy, HistogramStrategy, Parallel, Sequential};

use crate::{container::Header, error::Result, io::FixedMemory, properties::EngineConfig};

/// Compresses an in-memory buffer with the sequential strategy and default settings.
pub fn compress_bytes(bytes: &[u8], filename: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    Compressor::new(Sequential, EngineConfig::default()).compress(
        &mut Cursor::new(bytes),
        filename,
        &mut FixedMemory::default(),
        &mut out,
    )?;
    Ok(out)
}

/// Decompresses an in-memory container, returning its header and the original bytes.
pub fn decompress_bytes(bytes: &[u8]) -> Result<(Header, Vec<u8>)> {
    let mut source = Cursor::new(bytes);
    let decompressor = Decompressor::open(&mut source, EngineConfig::default())?;
    let header = decompressor.header().clone();

    let mut out = Vec::with_capacity(header.original_len.min(1 << 20) as usize);
    decompressor.decode_into(&mut out)?;
    Ok((header, out))
}
