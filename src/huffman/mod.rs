use std::{cmp::{Ordering, Reverse}, collections::BinaryHeap, fmt};

use crate::{bitstreams::BitRead, error::Result};

pub mod tree_codec;

pub const BITS_PER_WORD: u32 = 8;
pub const BITS_PER_INT: u32 = 32;
pub const ALPH_SIZE: usize = 1 << BITS_PER_WORD;
/// Reserved symbol marking the end of the encoded payload
pub const PSEUDO_EOF: u16 = ALPH_SIZE as u16;
pub const HUFF_NUMBER: u32 = 0xface8200;
/// Magic number opening every compressed stream
pub const HUFF_TREE: u32 = HUFF_NUMBER | 1;

/// Occurrence count of every 8-bit symbol
pub type FrequencyTable = [u64; ALPH_SIZE];

/// Reads 8-bit words until the stream is exhausted and counts them.
///
/// The stream is left at its end; rewind it before reading it again.
pub fn count_frequencies(reader: &mut impl BitRead) -> Result<FrequencyTable> {
    let mut counts = [0; ALPH_SIZE];

    while let Some(val) = reader.read_bits(BITS_PER_WORD)? {
        counts[val as usize] += 1;
    }

    Ok(counts)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: u16,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(symbol: u16, weight: u64) -> Self {
        HuffNode::Leaf { symbol, weight }
    }

    pub fn merge(left: Self, right: Self) -> Self {
        HuffNode::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }
}

/// A forest node waiting to be merged. Ordered by weight, ties broken by
/// the order in which nodes entered the forest.
#[derive(Debug)]
struct MergeEntry {
    weight: u64,
    seq: usize,
    node: HuffNode,
}

impl MergeEntry {
    fn new(node: HuffNode, seq: usize) -> Self {
        Self { weight: node.weight(), seq, node }
    }
}

impl Ord for MergeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.weight == other.weight {
            return self.seq.cmp(&other.seq);
        }
        self.weight.cmp(&other.weight)
    }
}

impl PartialOrd for MergeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for MergeEntry {}

impl PartialEq for MergeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    pub fn new(root: HuffNode) -> Self {
        Self { root }
    }

    /// Greedy Huffman construction over every symbol with a nonzero count,
    /// plus `PSEUDO_EOF` with weight 1.
    ///
    /// Leaves enter the forest in ascending symbol order and merged nodes
    /// after them in creation order; equal weights pop in that order, so the
    /// same counts always give the same tree.
    pub fn from_frequencies(counts: &FrequencyTable) -> Self {
        let mut forest = BinaryHeap::with_capacity(ALPH_SIZE + 1);
        let mut seq = 0;

        for (symbol, &count) in counts.iter().enumerate() {
            if count > 0 {
                forest.push(Reverse(MergeEntry::new(HuffNode::leaf(symbol as u16, count), seq)));
                seq += 1;
            }
        }
        forest.push(Reverse(MergeEntry::new(HuffNode::leaf(PSEUDO_EOF, 1), seq)));
        seq += 1;

        while forest.len() > 1 {
            if let (Some(Reverse(left)), Some(Reverse(right))) = (forest.pop(), forest.pop()) {
                forest.push(Reverse(MergeEntry::new(HuffNode::merge(left.node, right.node), seq)));
                seq += 1;
            }
        }

        let root = forest
            .pop()
            .map(|Reverse(entry)| entry.node)
            .unwrap_or_else(|| HuffNode::leaf(PSEUDO_EOF, 1));

        HuffmanTree::new(root)
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];

        while let Some(node) = stack.pop() {
            match node {
                HuffNode::Leaf { .. } => count += 1,
                HuffNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        count
    }

    /// Maps every leaf symbol to its root-to-leaf path, `0` for left and `1`
    /// for right. A tree made of a single leaf gives that leaf the empty code.
    pub fn encoding_table(&self) -> EncodingTable {
        let mut table = EncodingTable::default();
        let mut stack = vec![(&self.root, Code::default())];

        while let Some((node, path)) = stack.pop() {
            match node {
                HuffNode::Leaf { symbol, .. } => table.insert(*symbol, path),
                HuffNode::Internal { left, right, .. } => {
                    stack.push((right.as_ref(), path.with_bit(true)));
                    stack.push((left.as_ref(), path.with_bit(false)));
                }
            }
        }

        table
    }
}

/// Variable-length bit string, MSB first.
///
/// Huffman code lengths grow with the logarithm of the total weight, so 128
/// bits cover any tree built from `u64` counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: u128,
    len: u32,
}

impl Code {
    pub const MAX_LEN: u32 = u128::BITS;

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The code extended by one bit.
    pub fn with_bit(&self, bit: bool) -> Self {
        assert!(self.len < Self::MAX_LEN, "Code longer than {} bits", Self::MAX_LEN);
        Self { bits: (self.bits << 1) | bit as u128, len: self.len + 1 }
    }

    /// Bit at `index`, counted from the first (most significant) one.
    pub fn bit(&self, index: u32) -> bool {
        debug_assert!(index < self.len);
        (self.bits >> (self.len - 1 - index)) & 1 == 1
    }

    /// Whether `self` is a prefix of `other` (every code is a prefix of itself).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.bits.checked_shr(other.len - self.len).unwrap_or(0) == self.bits
    }

    /// Splits the code into chunks of at most 32 bits, first chunk first.
    pub fn chunks(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let full = self.len / 32;
        let head = self.len % 32;
        let head = (head > 0).then(|| (head, (self.bits >> (full * 32)) as u32));

        head.into_iter().chain((0..full).rev().map(move |i| (32, (self.bits >> (i * 32)) as u32)))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            write!(f, "{}", if self.bit(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Code of every symbol in `0..=PSEUDO_EOF` present in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingTable {
    codes: Vec<Option<Code>>,
}

impl Default for EncodingTable {
    fn default() -> Self {
        Self { codes: vec![None; ALPH_SIZE + 1] }
    }
}

impl EncodingTable {
    fn insert(&mut self, symbol: u16, code: Code) {
        self.codes[symbol as usize] = Some(code);
    }

    pub fn get(&self, symbol: u16) -> Option<&Code> {
        self.codes.get(symbol as usize).and_then(Option::as_ref)
    }

    /// Present symbols with their codes, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|c| (symbol as u16, c)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
