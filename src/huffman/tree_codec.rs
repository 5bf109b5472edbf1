//! Pre-order bit serialization of a [`HuffmanTree`].
//!
//! An internal node is a single `0` bit followed by its left and right
//! subtrees; a leaf is a `1` bit followed by its symbol in
//! `BITS_PER_WORD + 1` bits. Both directions walk the tree with an explicit
//! stack. A header with more internal nodes than a tree over the 257-symbol
//! alphabet can hold is rejected while it is read, which bounds both the
//! memory it takes and the depth of the tree handed back.

use crate::{bitstreams::{BitRead, BitWrite}, error::{FormatError, Result}};

use super::{HuffNode, HuffmanTree, BITS_PER_WORD, PSEUDO_EOF};

/// Width of a leaf value, enough for every byte and `PSEUDO_EOF`
pub const LEAF_BITS: u32 = BITS_PER_WORD + 1;

/// Internal nodes of a tree with one leaf per symbol of `0..=PSEUDO_EOF`
pub const MAX_INTERNAL_NODES: usize = PSEUDO_EOF as usize;

/// Writes `tree` and returns the number of bits it took.
pub fn write_tree(tree: &HuffmanTree, writer: &mut impl BitWrite) -> Result<usize> {
    let mut written = 0;
    let mut stack = vec![&tree.root];

    while let Some(node) = stack.pop() {
        match node {
            HuffNode::Leaf { symbol, .. } => {
                writer.write_bits(1, 1)?;
                writer.write_bits(LEAF_BITS, *symbol as u32)?;
                written += 1 + LEAF_BITS as usize;
            }
            HuffNode::Internal { left, right, .. } => {
                writer.write_bits(1, 0)?;
                written += 1;
                stack.push(right);
                stack.push(left);
            }
        }
    }

    Ok(written)
}

/// Reads back a tree written by [`write_tree`]. Weights are not transmitted
/// and come back as zero.
pub fn read_tree(reader: &mut impl BitRead) -> Result<HuffmanTree> {
    // Internal nodes still waiting for children, holding the left one once known
    let mut pending: Vec<Option<HuffNode>> = Vec::new();
    let mut internal_nodes = 0;

    loop {
        let bit = reader.read_bits(1)?.ok_or(FormatError::TruncatedTree)?;

        if bit == 0 {
            internal_nodes += 1;
            if internal_nodes > MAX_INTERNAL_NODES {
                return Err(FormatError::OversizedTree(MAX_INTERNAL_NODES).into());
            }
            pending.push(None);
            continue;
        }

        let value = reader.read_bits(LEAF_BITS)?.ok_or(FormatError::TruncatedTree)?;
        if value > PSEUDO_EOF as u32 {
            return Err(FormatError::InvalidSymbol(value).into());
        }

        let mut node = HuffNode::leaf(value as u16, 0);

        // Hang the finished subtree on its parent, closing every parent that
        // thereby receives its right child.
        loop {
            match pending.pop() {
                None => return Ok(HuffmanTree::new(node)),
                Some(None) => {
                    pending.push(Some(node));
                    break;
                }
                Some(Some(left)) => node = HuffNode::merge(left, node),
            }
        }
    }
}
