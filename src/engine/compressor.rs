use std::mem::size_of;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    bitstreams::BitWriter,
    container::Header,
    error::Result,
    huffman::{CodeTable, Codeword, Histogram},
    io::{ByteSink, ByteSource, MemoryProbe},
    properties::EngineConfig,
    utils::Timer,
};

use super::{
    plan::ChunkPlan,
    strategy::{EncodeStrategy, HistogramStrategy},
};

/// Bytes of lookup buffer needed per input byte.
pub const LOOKUP_EXPANSION: u64 = size_of::<Codeword>() as u64;

#[derive(Clone, Debug, Default, Serialize)]
pub struct CompressionReport {
    pub filename: String,
    pub input_bytes: u64,
    pub header_bytes: u64,
    pub output_bytes: u64,
    pub symbols: usize,
    pub macrochunks: u64,
    pub microchunks: u64,
    /// Shannon entropy of the input in bits per byte.
    pub entropy: f64,
    /// Bits per byte actually spent by the code table.
    pub average_code_len: f64,
    pub histogram_nanos: u128,
    pub table_nanos: u128,
    pub encode_nanos: u128,
}

impl CompressionReport {
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.output_bytes as f64 / self.input_bytes as f64
    }
}

/// Two-pass chunked compressor.
///
/// Pass 1 counts every macrochunk into one histogram. The code table and the header
/// follow. Pass 2 reads the macrochunks again and encodes them microchunk by
/// microchunk, handing the finished bytes to the sink after each macrochunk.
pub struct Compressor<S> {
    strategy: S,
    config: EngineConfig,
}

impl<S: HistogramStrategy + EncodeStrategy> Compressor<S> {
    pub fn new(strategy: S, config: EngineConfig) -> Self {
        Self { strategy, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compress<R, M, W>(&self, source: &mut R, filename: &str, memory: &mut M, sink: &mut W) -> Result<CompressionReport>
    where
        R: ByteSource + ?Sized,
        M: MemoryProbe + ?Sized,
        W: ByteSink + ?Sized,
    {
        self.config.validate()?;

        let input_bytes = source.byte_len()?;
        let plan = ChunkPlan::macrochunks(input_bytes, self.config.compress_macrochunk_max);
        info!(
            "compressing {filename}: {input_bytes} bytes in {} macrochunks of {} bytes, {} left over",
            plan.count,
            plan.size,
            plan.remainder()
        );

        let mut histogram_timer = Timer::new();
        let histo = histogram_timer.measure(|| self.histogram(source, &plan))?;

        let mut table_timer = Timer::new();
        let table = table_timer.measure(|| build_table(&histo))?;
        let entropy = histo.entropy();
        let average_code_len = table.average_len(&histo);
        info!(
            "{} symbols, entropy {entropy:.4} bits/byte, average code {average_code_len:.4} bits, longest code {} bits",
            table.len(),
            table.max_len()
        );

        let header = Header::new(filename, &table, input_bytes);
        let mut writer = BitWriter::new();
        header.write(&mut writer)?;

        let mut output_bytes = 0;
        emit(sink, &mut writer, &mut output_bytes)?;
        debug!("header written, payload starts at byte {output_bytes}");

        let mut encode_timer = Timer::new();
        let microchunks = encode_timer.measure(|| -> Result<u64> {
            let microchunks = self.encode(source, &plan, &table, memory, &mut writer, sink, &mut output_bytes)?;
            writer.flush();
            emit(sink, &mut writer, &mut output_bytes)?;
            Ok(microchunks)
        })?;

        info!("{filename}: {input_bytes} -> {output_bytes} bytes");

        Ok(CompressionReport {
            filename: filename.to_owned(),
            input_bytes,
            header_bytes: header.encoded_len(),
            output_bytes,
            symbols: table.len(),
            macrochunks: plan.num_ranges(),
            microchunks,
            entropy,
            average_code_len,
            histogram_nanos: histogram_timer.nanos(),
            table_nanos: table_timer.nanos(),
            encode_nanos: encode_timer.nanos(),
        })
    }

    fn histogram<R: ByteSource + ?Sized>(&self, source: &mut R, plan: &ChunkPlan) -> Result<Histogram> {
        let mut histo = Histogram::new();

        for (k, (offset, len)) in plan.ranges().enumerate() {
            let chunk = source.read_chunk(offset, len as usize)?;
            histo.merge_from(&self.strategy.accumulate(&chunk));
            debug!("histogram: macrochunk {}/{}", k + 1, plan.num_ranges());
        }

        Ok(histo)
    }

    #[allow(clippy::too_many_arguments)]
    fn encode<R, M, W>(
        &self,
        source: &mut R,
        plan: &ChunkPlan,
        table: &CodeTable,
        memory: &mut M,
        writer: &mut BitWriter,
        sink: &mut W,
        output_bytes: &mut u64,
    ) -> Result<u64>
    where
        R: ByteSource + ?Sized,
        M: MemoryProbe + ?Sized,
        W: ByteSink + ?Sized,
    {
        let mut lookups = Vec::new();
        let mut microchunks = 0;

        for (k, (offset, len)) in plan.ranges().enumerate() {
            let chunk = source.read_chunk(offset, len as usize)?;

            let available = memory.available_memory();
            let micro = ChunkPlan::microchunks(len, available, LOOKUP_EXPANSION);
            debug!(
                "encode: macrochunk {}/{}, {} microchunks of {} bytes ({available} bytes available)",
                k + 1,
                plan.num_ranges(),
                micro.count,
                micro.size
            );

            for (start, n) in micro.ranges() {
                let start = start as usize;
                self.strategy.lookup(table, &chunk[start..start + n as usize], &mut lookups)?;

                for cw in lookups.iter() {
                    writer.push_bits(cw.code, cw.len as u64)?;
                }
                microchunks += 1;
            }

            emit(sink, writer, output_bytes)?;
        }

        Ok(microchunks)
    }
}

/// An empty input has no symbols and gets an empty table.
fn build_table(histo: &Histogram) -> Result<CodeTable> {
    if histo.total() == 0 {
        return Ok(CodeTable::default());
    }
    CodeTable::from_histogram(histo)
}

fn emit<W: ByteSink + ?Sized>(sink: &mut W, writer: &mut BitWriter, output_bytes: &mut u64) -> Result<()> {
    let bytes = writer.drain();
    if bytes.is_empty() {
        return Ok(());
    }

    sink.write_bytes(&bytes)?;
    *output_bytes += bytes.len() as u64;
    Ok(())
}
