pub mod bitstreams;
pub mod error;
pub mod huffman;
pub mod processor;
pub mod properties;
pub mod utils;

pub use error::{FormatError, HuffError, Result};
pub use processor::{compress_bytes, decompress_bytes, CompressionStats, HuffProcessor};
pub use properties::Properties;
