//! Error types for compression and decompression.
//!
//! Library code never panics on malformed input: a corrupt or truncated
//! stream surfaces as a [`FormatError`], and failures of the underlying
//! reader or writer are passed through untouched as [`HuffError::Io`].

use thiserror::Error;

/// Top-level error returned by every fallible operation of the crate.
#[derive(Debug, Error)]
pub enum HuffError {
    /// The compressed stream is not a valid Huffman stream
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// The underlying reader or writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input held a byte on the encoding pass that the counting pass never saw
    #[error("input changed between passes: symbol {0} was not counted")]
    InputChanged(u16),

    /// A configuration value could not be parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Ways in which a compressed stream can be malformed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// The leading 32 bits are not the format's magic number
    #[error("invalid magic number: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    /// The stream ended before 32 bits of magic number could be read
    #[error("stream too short to hold the magic number")]
    TruncatedHeader,

    /// The stream ended in the middle of the serialized tree
    #[error("unexpected end of stream while reading the tree")]
    TruncatedTree,

    /// A tree leaf carries a value outside the alphabet
    #[error("tree leaf holds symbol {0}, outside the alphabet")]
    InvalidSymbol(u32),

    /// The tree has more internal nodes than any tree over the alphabet
    #[error("tree holds more than {0} internal nodes")]
    OversizedTree(usize),

    /// The tree is a single leaf that is not the end-of-stream symbol
    #[error("tree is a single leaf for symbol {0} and can never terminate")]
    DegenerateTree(u16),

    /// The stream ended before the end-of-stream code was decoded
    #[error("unexpected end of stream before PSEUDO_EOF")]
    TruncatedBody,
}

pub type Result<T> = std::result::Result<T, HuffError>;
