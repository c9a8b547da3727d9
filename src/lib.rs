pub mod error;
pub mod bitstreams;
pub mod huffman;
pub mod container;
pub mod engine;
pub mod io;
pub mod properties;
pub mod utils;

pub use container::Header;
pub use engine::{
    compress_bytes, decompress_bytes, CompressionReport, Compressor, DecompressionReport, Decompressor, Parallel,
    Sequential,
};
pub use error::{Error, Result};
pub use properties::EngineConfig;
