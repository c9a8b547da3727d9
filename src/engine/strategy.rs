//! How a chunk is counted and how its bytes are mapped to codewords.
//!
//! Both steps are side-effect free, so they may run on worker threads. Packing the
//! codewords into bits is order dependent and always stays with the caller.

use std::io;

use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

use crate::{
    error::{Error, Result},
    huffman::{CodeTable, Codeword, Histogram},
    properties::EngineConfig,
};

pub trait HistogramStrategy {
    fn accumulate(&self, bytes: &[u8]) -> Histogram;
}

pub trait EncodeStrategy {
    /// Replaces the contents of `out` with the codeword of every byte, in order.
    fn lookup(&self, table: &CodeTable, bytes: &[u8], out: &mut Vec<Codeword>) -> Result<()>;
}

#[inline(always)]
fn codeword(table: &CodeTable, symbol: u8) -> Result<Codeword> {
    table.codeword(symbol).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("byte {symbol:#04x} was not counted while building the code table"),
        )
        .into()
    })
}

/// Everything on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl HistogramStrategy for Sequential {
    fn accumulate(&self, bytes: &[u8]) -> Histogram {
        Histogram::accumulate(bytes)
    }
}

impl EncodeStrategy for Sequential {
    fn lookup(&self, table: &CodeTable, bytes: &[u8], out: &mut Vec<Codeword>) -> Result<()> {
        out.clear();
        out.reserve(bytes.len());

        for &b in bytes {
            out.push(codeword(table, b)?);
        }
        Ok(())
    }
}

/// Data-parallel counting and lookup on a dedicated, bounded thread pool.
///
/// Each task covers at least `grain` bytes. Partial histograms are combined with
/// [`Histogram::merge`]; lookups are collected back in input order.
pub struct Parallel {
    pool: ThreadPool,
    grain: usize,
}

impl Parallel {
    pub fn new(threads: usize, grain: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("bcp-worker-{i}"))
            .build()
            .map_err(|e| Error::Config(format!("cannot start worker pool: {e}")))?;

        Ok(Self { pool, grain: grain.max(1) })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.threads, config.parallel_grain)
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl HistogramStrategy for Parallel {
    fn accumulate(&self, bytes: &[u8]) -> Histogram {
        self.pool.install(|| {
            bytes
                .par_chunks(self.grain)
                .map(Histogram::accumulate)
                .reduce(Histogram::new, Histogram::merge)
        })
    }
}

impl EncodeStrategy for Parallel {
    fn lookup(&self, table: &CodeTable, bytes: &[u8], out: &mut Vec<Codeword>) -> Result<()> {
        let codewords = self.pool.install(|| {
            bytes
                .par_iter()
                .with_min_len(self.grain)
                .map(|&b| codeword(table, b))
                .collect::<Result<Vec<_>>>()
        })?;

        *out = codewords;
        Ok(())
    }
}
