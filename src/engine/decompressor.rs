use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    bitstreams::BitReader,
    container::Header,
    error::{Error, Result},
    huffman::CodeTable,
    io::{ByteSink, ByteSource},
    properties::EngineConfig,
    utils::Timer,
};

use super::plan::ChunkPlan;

#[derive(Clone, Debug, Default, Serialize)]
pub struct DecompressionReport {
    pub filename: String,
    pub input_bytes: u64,
    pub header_bytes: u64,
    pub output_bytes: u64,
    pub symbols: usize,
    pub macrochunks: u64,
    pub decode_nanos: u128,
}

/// Bit-by-bit canonical decoder whose partial code survives buffer reloads.
///
/// A code may start in one payload slice and end in the next: the bits already read
/// stay in `tentative_code`/`tentative_len` (and in the reader's bit buffer) until
/// [`StreamDecoder::decode_chunk`] is handed the following slice.
#[derive(Debug)]
pub struct StreamDecoder<'t> {
    table: &'t CodeTable,
    reader: BitReader,
    tentative_code: u64,
    tentative_len: u8,
    /// Payload offset of the slice currently loaded.
    chunk_offset: u64,
    emitted: u64,
    expected: u64,
}

impl<'t> StreamDecoder<'t> {
    pub fn new(table: &'t CodeTable, expected: u64) -> Self {
        Self {
            table,
            reader: BitReader::default(),
            tentative_code: 0,
            tentative_len: 0,
            chunk_offset: 0,
            emitted: 0,
            expected,
        }
    }

    /// Symbols decoded so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn is_done(&self) -> bool {
        self.emitted >= self.expected
    }

    /// Decodes the payload slice starting at payload byte `offset`, appending symbols to
    /// `out`. Stops early once every expected symbol is out.
    pub fn decode_chunk(&mut self, chunk: Vec<u8>, offset: u64, out: &mut Vec<u8>) -> Result<()> {
        self.reader.load(chunk);
        self.chunk_offset = offset;

        let min_len = self.table.min_len();
        let max_len = self.table.max_len();

        while !self.is_done() && self.reader.has_bits() {
            let bit = self.reader.read_bit()?;
            self.tentative_code = (self.tentative_code << 1) | bit;
            self.tentative_len += 1;

            if self.tentative_len > max_len {
                return Err(self.corrupt());
            }
            if self.tentative_len < min_len {
                continue;
            }

            if let Some(symbol) = self.table.symbol(self.tentative_code, self.tentative_len) {
                out.push(symbol);
                self.emitted += 1;
                self.tentative_code = 0;
                self.tentative_len = 0;
            }
        }

        Ok(())
    }

    /// Fails if the payload ended before every expected symbol was decoded.
    pub fn finish(&self) -> Result<u64> {
        if !self.is_done() {
            return Err(self.corrupt());
        }
        Ok(self.emitted)
    }

    fn corrupt(&self) -> Error {
        Error::CorruptStream {
            offset: self.chunk_offset + self.reader.tell() as u64,
            tentative_len: self.tentative_len as u32,
        }
    }
}

/// Chunked decompressor over a random-access source.
///
/// The header is parsed once by [`Decompressor::open`]; the payload after it is then
/// read in slices of at most `decompress_macrochunk_max` bytes.
pub struct Decompressor<'a, S: ByteSource + ?Sized> {
    source: &'a mut S,
    header: Header,
    table: CodeTable,
    config: EngineConfig,
    input_bytes: u64,
}

impl<'a, S: ByteSource + ?Sized> Decompressor<'a, S> {
    pub fn open(source: &'a mut S, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let input_bytes = source.byte_len()?;
        let header = Header::read_from(&mut *source)?;
        let table = header.code_table()?;
        debug!(
            "header of {}: {} symbols, {} original bytes, payload at byte {}",
            header.filename,
            table.len(),
            header.original_len,
            header.encoded_len()
        );

        Ok(Self { source, header, table, config, input_bytes })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.table
    }

    pub fn decode_into<W: ByteSink + ?Sized>(self, sink: &mut W) -> Result<DecompressionReport> {
        let data_start = self.header.encoded_len();
        let payload_len = self.input_bytes.saturating_sub(data_start);
        let plan = ChunkPlan::macrochunks(payload_len, self.config.decompress_macrochunk_max);
        info!(
            "decompressing {}: {payload_len} payload bytes in {} macrochunks of {} bytes, {} left over",
            self.header.filename,
            plan.count,
            plan.size,
            plan.remainder()
        );

        let mut timer = Timer::new();
        let (output_bytes, macrochunks, consumed) = timer.measure(|| -> Result<(u64, u64, u64)> {
            let mut decoder = StreamDecoder::new(&self.table, self.header.original_len);
            let mut out = Vec::new();
            let mut macrochunks = 0;
            let mut consumed = 0;

            for (offset, len) in plan.ranges() {
                if decoder.is_done() {
                    break;
                }

                let chunk = self.source.read_chunk(data_start + offset, len as usize)?;
                decoder.decode_chunk(chunk, offset, &mut out)?;
                sink.write_bytes(&out)?;
                out.clear();

                consumed += len;
                macrochunks += 1;
                debug!("decode: macrochunk {macrochunks}/{}, {} symbols so far", plan.num_ranges(), decoder.emitted());
            }

            Ok((decoder.finish()?, macrochunks, consumed))
        })?;

        if consumed < payload_len {
            warn!("{} payload bytes after the last symbol were ignored", payload_len - consumed);
        }
        info!("{}: {} -> {output_bytes} bytes", self.header.filename, self.input_bytes);

        Ok(DecompressionReport {
            filename: self.header.filename.clone(),
            input_bytes: self.input_bytes,
            header_bytes: data_start,
            output_bytes,
            symbols: self.table.len(),
            macrochunks,
            decode_nanos: timer.nanos(),
        })
    }
}
