//! Error types shared by every stage of the codec.

use thiserror::Error;

/// Top-level error returned by the compressor, the decompressor and their collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// The container is not a BCP stream or its header is malformed.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A read or write on a source or sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bit-level reader/writer misuse (reading past the buffer, bad widths).
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// No canonical code matched the bits read from the payload.
    #[error("corrupt stream at payload byte {offset}: no code matches a {tentative_len}-bit sequence")]
    CorruptStream { offset: u64, tentative_len: u32 },

    /// The histogram has too few distinct symbols to build a Huffman tree.
    #[error("degenerate input: {distinct_symbols} distinct symbols")]
    DegenerateInput { distinct_symbols: usize },

    /// A Huffman leaf ended up deeper than the widest code the bit writer accepts.
    #[error("code for symbol {symbol} is {length} bits long, the limit is 64")]
    CodeTooLong { symbol: u8, length: u32 },

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Container header errors.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid magic number: expected {expected:#010x}, got {actual:#010x}")]
    BadMagic { expected: u32, actual: u32 },

    #[error("truncated header while reading the {section}")]
    Truncated { section: &'static str },

    #[error("symbol {symbol} has invalid code length {length}")]
    InvalidCodeLength { symbol: u8, length: u8 },

    #[error("symbol table declares {0} entries, a byte alphabet has 256")]
    TooManySymbols(u32),

    #[error("symbol {0} appears twice in the symbol table")]
    DuplicateSymbol(u8),

    #[error("code lengths oversubscribe the code space")]
    OversubscribedTable,

    #[error("original filename is not valid UTF-8")]
    InvalidFilename,

    #[error("original filename is {0} bytes long, at most u32::MAX is allowed")]
    FilenameTooLong(usize),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    #[error("invalid bit count: {0}")]
    InvalidBitCount(u32),

    #[error("seek to byte {position} outside a buffer of {len} bytes")]
    SeekOutOfRange { position: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
