//! Compression and decompression of whole streams.
//!
//! A compressed stream is the 32-bit magic number [`HUFF_TREE`], the
//! pre-order serialized tree, one code per input byte, and finally the code
//! of [`PSEUDO_EOF`]. The output is padded with zeros to a byte boundary.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    bitstreams::{BinaryReader, BinaryWriter, BitRead, BitWrite},
    error::{FormatError, HuffError, Result},
    huffman::{
        count_frequencies,
        tree_codec::{read_tree, write_tree},
        Code, HuffNode, HuffmanTree, BITS_PER_INT, BITS_PER_WORD, HUFF_TREE, PSEUDO_EOF,
    },
    properties::Properties,
};

/// What a single run read and wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionStats {
    /// Bits taken from the input, both passes included when compressing
    pub bits_read: usize,
    /// Bits handed to the output, padding excluded
    pub bits_written: usize,
    /// Raw bytes encoded or decoded
    pub symbols: usize,
    /// Leaves of the tree, `PSEUDO_EOF` included
    pub tree_leaves: usize,
    /// Size of the serialized tree
    pub tree_bits: usize,
}

pub struct HuffProcessor {
    props: Properties,
}

impl HuffProcessor {
    pub fn new(props: Properties) -> Self {
        Self { props }
    }

    /// Compresses everything `input` holds into `output`, then closes `output`.
    ///
    /// The input is read twice: once to count the symbols and, after a reset,
    /// once to encode them.
    pub fn compress(&self, input: &mut impl BitRead, output: &mut impl BitWrite) -> Result<CompressionStats> {
        let counts = count_frequencies(input)?;
        let tree = HuffmanTree::from_frequencies(&counts);
        input.reset()?;

        output.write_bits(BITS_PER_INT, HUFF_TREE)?;
        let tree_bits = write_tree(&tree, output)?;

        let encodings = tree.encoding_table();

        if self.props.debug {
            debug!("tree has {} leaves in {} bits", encodings.len(), tree_bits);
            for (symbol, code) in encodings.iter() {
                debug!("encoding for {}: {}", symbol, code);
            }
        }

        let mut symbols = 0;
        while let Some(val) = input.read_bits(BITS_PER_WORD)? {
            let code = encodings.get(val as u16).ok_or(HuffError::InputChanged(val as u16))?;
            write_code(output, code)?;
            symbols += 1;
        }

        if let Some(code) = encodings.get(PSEUDO_EOF) {
            write_code(output, code)?;
        }
        output.close()?;

        let stats = CompressionStats {
            bits_read: input.bits_read(),
            bits_written: output.bits_written(),
            symbols,
            tree_leaves: encodings.len(),
            tree_bits,
        };
        self.log_stats("compressed", &stats);

        Ok(stats)
    }

    /// Decompresses `input` into `output`, then closes `output`.
    ///
    /// On a format error the bytes decoded so far stay in `output`.
    pub fn decompress(&self, input: &mut impl BitRead, output: &mut impl BitWrite) -> Result<CompressionStats> {
        let magic = input.read_bits(BITS_PER_INT)?.ok_or(FormatError::TruncatedHeader)?;
        if magic != HUFF_TREE {
            return Err(FormatError::BadMagic { expected: HUFF_TREE, found: magic }.into());
        }

        let tree_start = input.bits_read();
        let tree = read_tree(input)?;
        let tree_bits = input.bits_read() - tree_start;
        let tree_leaves = tree.leaf_count();

        if self.props.debug {
            debug!("read tree with {} leaves in {} bits", tree_leaves, tree_bits);
        }

        let root = &tree.root;
        if let HuffNode::Leaf { symbol, .. } = root {
            // A lone leaf has the empty code; only PSEUDO_EOF can stand there
            if *symbol != PSEUDO_EOF {
                return Err(FormatError::DegenerateTree(*symbol).into());
            }
        }

        let mut symbols = 0;
        loop {
            let symbol = walk_to_leaf(root, input)?;
            if symbol == PSEUDO_EOF {
                break;
            }
            output.write_bits(BITS_PER_WORD, symbol as u32)?;
            symbols += 1;
        }
        output.close()?;

        let stats = CompressionStats {
            bits_read: input.bits_read(),
            bits_written: output.bits_written(),
            symbols,
            tree_leaves,
            tree_bits,
        };
        self.log_stats("decompressed", &stats);

        Ok(stats)
    }

    fn log_stats(&self, action: &str, stats: &CompressionStats) {
        info!("{} {} bytes: {} bits read, {} bits written", action, stats.symbols, stats.bits_read, stats.bits_written);
        if self.props.debug {
            debug!("{:?}", stats);
        }
    }
}

/// Follows input bits from `root` down to a leaf and returns its symbol.
/// Reads nothing when `root` is itself a leaf.
fn walk_to_leaf(root: &HuffNode, input: &mut impl BitRead) -> Result<u16> {
    let mut current = root;
    loop {
        match current {
            HuffNode::Leaf { symbol, .. } => return Ok(*symbol),
            HuffNode::Internal { left, right, .. } => {
                let bit = input.read_bits(1)?.ok_or(FormatError::TruncatedBody)?;
                current = if bit == 0 { left.as_ref() } else { right.as_ref() };
            }
        }
    }
}

fn write_code(output: &mut impl BitWrite, code: &Code) -> Result<()> {
    for (len, value) in code.chunks() {
        output.write_bits(len, value)?;
    }
    Ok(())
}

/// Compresses an in-memory buffer.
pub fn compress_bytes(bytes: &[u8], props: &Properties) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::from_bytes(bytes);
    let mut writer = BinaryWriter::in_memory();

    HuffProcessor::new(*props).compress(&mut reader, &mut writer)?;

    Ok(writer.into_inner()?)
}

/// Decompresses an in-memory buffer.
pub fn decompress_bytes(bytes: &[u8], props: &Properties) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::from_bytes(bytes);
    let mut writer = BinaryWriter::in_memory();

    HuffProcessor::new(*props).decompress(&mut reader, &mut writer)?;

    Ok(writer.into_inner()?)
}

#[cfg(test)]
mod tests;
