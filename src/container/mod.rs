//! The `.bcp` container header.
//!
//! ```text
//! offset      size      field
//! 0           4         magic number 0x42435001
//! 4           4         original filename length (m)
//! 8           m         original filename
//! 8+m         4         symbol count (n)
//! 12+m        2n        n x (symbol, code length), ascending by (length, symbol)
//! 12+m+2n     8         original length in bytes
//! 20+m+2n     ...       MSB-first canonical Huffman payload, zero padded
//! ```
//!
//! Every integer is big-endian, exactly as the bit writer lays it out.

use crate::{
    bitstreams::{BitReader, BitWriter},
    error::{BitIoError, Error, FormatError, Result},
    huffman::{CodeTable, DepthMap, MAX_CODE_LEN, NUM_SYMBOLS},
    io::ByteSource,
};

pub const MAGIC: u32 = 0x4243_5001;
/// Extension given to compressed files.
pub const EXTENSION: &str = "bcp";

const PREFIX_LEN: u64 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub filename: String,
    pub depth_map: DepthMap,
    pub original_len: u64,
}

impl Header {
    pub fn new(filename: &str, table: &CodeTable, original_len: u64) -> Self {
        Self {
            filename: filename.to_owned(),
            depth_map: table.depth_map(),
            original_len,
        }
    }

    /// Header size in bytes, i.e. the offset of the first payload byte.
    pub fn encoded_len(&self) -> u64 {
        PREFIX_LEN + self.filename.len() as u64 + 4 + 2 * self.depth_map.len() as u64 + 8
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<()> {
        let name = self.filename.as_bytes();
        let name_len = u32::try_from(name.len()).map_err(|_| FormatError::FilenameTooLong(name.len()))?;

        writer.push_bits(MAGIC as u64, 32)?;
        writer.push_bits(name_len as u64, 32)?;
        writer.push_bytes(name)?;

        writer.push_bits(self.depth_map.len() as u64, 32)?;
        // Symbol first, then length.
        for &(code_len, symbol) in self.depth_map.entries() {
            writer.push_bits(symbol as u64, 8)?;
            writer.push_bits(code_len as u64, 8)?;
        }

        writer.push_bits(self.original_len, 64)?;
        Ok(())
    }

    /// Parses a header held entirely in `reader`, leaving the cursor on the payload.
    pub fn parse(reader: &mut BitReader) -> Result<Self> {
        let name_len = parse_prefix(reader)?;
        let (filename, symbols) = parse_name(reader, name_len)?;
        let (depth_map, original_len) = parse_table(reader, symbols)?;

        Ok(Self { filename, depth_map, original_len })
    }

    /// Parses the header at the start of `source`, reading only the bytes it spans.
    pub fn read_from<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self> {
        let total = source.byte_len()?;

        let mut reader = BitReader::new(read_available(source, 0, PREFIX_LEN, total)?);
        let name_len = parse_prefix(&mut reader)?;

        reader.load(read_available(source, PREFIX_LEN, name_len as u64 + 4, total)?);
        let (filename, symbols) = parse_name(&mut reader, name_len)?;

        let table_at = PREFIX_LEN + name_len as u64 + 4;
        reader.load(read_available(source, table_at, 2 * symbols as u64 + 8, total)?);
        let (depth_map, original_len) = parse_table(&mut reader, symbols)?;

        Ok(Self { filename, depth_map, original_len })
    }

    pub fn code_table(&self) -> Result<CodeTable> {
        CodeTable::from_depth_map(&self.depth_map)
    }
}

fn read_available<S: ByteSource + ?Sized>(source: &mut S, offset: u64, want: u64, total: u64) -> Result<Vec<u8>> {
    let available = total.saturating_sub(offset).min(want);
    source.read_chunk(offset, available as usize)
}

fn field(reader: &mut BitReader, bits: u64, section: &'static str) -> Result<u64> {
    reader.read_int(bits).map_err(|e| truncated(e, section))
}

fn truncated(e: Error, section: &'static str) -> Error {
    match e {
        Error::BitIo(BitIoError::UnexpectedEof) => FormatError::Truncated { section }.into(),
        e => e,
    }
}

fn parse_prefix(reader: &mut BitReader) -> Result<u32> {
    let magic = field(reader, 32, "magic number")? as u32;
    if magic != MAGIC {
        return Err(FormatError::BadMagic { expected: MAGIC, actual: magic }.into());
    }

    Ok(field(reader, 32, "filename length")? as u32)
}

fn parse_name(reader: &mut BitReader, name_len: u32) -> Result<(String, u32)> {
    let name = reader
        .read_n_bytes(name_len as usize)
        .map_err(|e| truncated(e, "original filename"))?;
    let filename = String::from_utf8(name).map_err(|_| FormatError::InvalidFilename)?;

    let symbols = field(reader, 32, "symbol count")? as u32;
    if symbols as usize > NUM_SYMBOLS {
        return Err(FormatError::TooManySymbols(symbols).into());
    }

    Ok((filename, symbols))
}

fn parse_table(reader: &mut BitReader, symbols: u32) -> Result<(DepthMap, u64)> {
    let mut depth_map = DepthMap::default();

    for _ in 0..symbols {
        let symbol = field(reader, 8, "symbol table")? as u8;
        let code_len = field(reader, 8, "symbol table")? as u8;

        if code_len == 0 || code_len > MAX_CODE_LEN {
            return Err(FormatError::InvalidCodeLength { symbol, length: code_len }.into());
        }
        depth_map.push(code_len, symbol);
    }

    let original_len = field(reader, 64, "original length")?;
    Ok((depth_map, original_len))
}
