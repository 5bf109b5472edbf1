use std::io;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    bitstreams::{BinaryReader, BinaryWriter, BitRead, BitWrite},
    error::{FormatError, HuffError},
    huffman::{tree_codec::{LEAF_BITS, MAX_INTERNAL_NODES}, HUFF_TREE, PSEUDO_EOF},
    properties::Properties,
};

use super::{compress_bytes, decompress_bytes, HuffProcessor};

fn round_trip(input: &[u8]) -> Vec<u8> {
    let props = Properties::default();
    let compressed = compress_bytes(input, &props).unwrap();
    decompress_bytes(&compressed, &props).unwrap()
}

fn decompress_err(compressed: Vec<u8>) -> (HuffError, Vec<u8>) {
    let mut reader = BinaryReader::from_bytes(compressed);
    let mut writer = BinaryWriter::in_memory();

    let err = HuffProcessor::new(Properties::default())
        .decompress(&mut reader, &mut writer)
        .unwrap_err();

    (err, writer.into_inner().unwrap())
}

#[test]
fn test_small_input_layout() {
    let compressed = compress_bytes(&[0x61, 0x61, 0x61, 0x62], &Properties::default()).unwrap();

    assert_eq!(
        compressed,
        vec![
            0xFA, 0xCE, 0x82, 0x01, // magic
            0x26, 0x2C, 0x02, 0x61, // tree
            0b1110_0010,            // 1 1 1 00, then 01 for PSEUDO_EOF
        ]
    );
}

#[test]
fn test_small_input_round_trip() {
    assert_eq!(round_trip(&[0x61, 0x61, 0x61, 0x62]), vec![0x61, 0x61, 0x61, 0x62]);
}

#[test]
fn test_empty_input() {
    let compressed = compress_bytes(&[], &Properties::default()).unwrap();

    // Magic, then the lone PSEUDO_EOF leaf; its code is empty
    assert_eq!(compressed, vec![0xFA, 0xCE, 0x82, 0x01, 0xC0, 0x00]);
    assert!(decompress_bytes(&compressed, &Properties::default()).unwrap().is_empty());
}

#[test]
fn test_single_repeated_byte() {
    let input = vec![0u8; 1000];

    assert_eq!(round_trip(&input), input);
}

#[test]
fn test_every_byte_value() {
    let input: Vec<u8> = (0..=255).rev().chain(0..=255).collect();

    assert_eq!(round_trip(&input), input);
}

#[test]
fn test_text_round_trip() {
    let input = b"She sells sea shells by the sea shore, and the shells she sells are sea shells for sure.";

    assert_eq!(round_trip(input), input.to_vec());
}

#[test]
fn test_random_round_trips() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..50 {
        let len = rng.gen_range(0..4096);
        let alphabet = rng.gen_range(1..=256u32);
        let input: Vec<u8> = (0..len).map(|_| rng.gen_range(0..alphabet) as u8).collect();

        assert_eq!(round_trip(&input), input);
    }
}

#[test]
fn test_skewed_input_round_trip() {
    // Doubling counts give one code per depth level
    let mut input = Vec::new();
    for symbol in 0..16u8 {
        input.extend(std::iter::repeat(symbol).take(1usize << symbol));
    }

    assert_eq!(round_trip(&input), input);
}

#[test]
fn test_output_starts_with_magic() {
    let compressed = compress_bytes(b"header check", &Properties::default()).unwrap();

    assert_eq!(u32::from_be_bytes([compressed[0], compressed[1], compressed[2], compressed[3]]), HUFF_TREE);
}

#[test]
fn test_compression_is_deterministic() {
    let input = b"determinism: same bytes in, same bytes out".repeat(20);

    let first = compress_bytes(&input, &Properties::default()).unwrap();
    let second = compress_bytes(&input, &Properties { debug: true, write_stats: true }).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_compress_stats() {
    let mut reader = BinaryReader::from_bytes(vec![0x61, 0x61, 0x61, 0x62]);
    let mut writer = BinaryWriter::in_memory();

    let stats = HuffProcessor::new(Properties::default()).compress(&mut reader, &mut writer).unwrap();

    assert_eq!(stats.symbols, 4);
    assert_eq!(stats.bits_read, 64);
    assert_eq!(stats.tree_leaves, 3);
    assert_eq!(stats.tree_bits, 2 + 3 * (1 + LEAF_BITS as usize));
    assert_eq!(stats.bits_written, 32 + 32 + 7);
}

#[test]
fn test_decompress_stats() {
    let compressed = compress_bytes(&[0x61, 0x61, 0x61, 0x62], &Properties::default()).unwrap();
    let mut reader = BinaryReader::from_bytes(compressed);
    let mut writer = BinaryWriter::in_memory();

    let stats = HuffProcessor::new(Properties { debug: true, write_stats: false })
        .decompress(&mut reader, &mut writer)
        .unwrap();

    assert_eq!(stats.symbols, 4);
    assert_eq!(stats.bits_read, 32 + 32 + 7);
    assert_eq!(stats.bits_written, 32);
    assert_eq!(stats.tree_leaves, 3);
    assert_eq!(stats.tree_bits, 32);
}

#[test]
fn test_zeroed_header_is_rejected() {
    let mut compressed = compress_bytes(b"corrupt me", &Properties::default()).unwrap();
    compressed[..4].fill(0);

    let (err, written) = decompress_err(compressed);

    assert!(matches!(err, HuffError::Format(FormatError::BadMagic { expected: HUFF_TREE, found: 0 })));
    assert!(written.is_empty());
}

#[test]
fn test_short_header_is_rejected() {
    let (err, written) = decompress_err(vec![0xFA, 0xCE, 0x82]);

    assert!(matches!(err, HuffError::Format(FormatError::TruncatedHeader)));
    assert!(written.is_empty());
}

#[test]
fn test_missing_body_is_rejected() {
    let mut compressed = compress_bytes(&[0x61, 0x61, 0x61, 0x62], &Properties::default()).unwrap();
    // Magic and tree fill exactly the first eight bytes
    compressed.truncate(8);

    let (err, written) = decompress_err(compressed);

    assert!(matches!(err, HuffError::Format(FormatError::TruncatedBody)));
    assert!(written.is_empty());
}

#[test]
fn test_truncated_body_keeps_decoded_prefix() {
    let input = b"abcdefghijklmnopqrstuvwxyz".repeat(8);
    let mut compressed = compress_bytes(&input, &Properties::default()).unwrap();
    compressed.truncate(compressed.len() - 20);

    let (err, written) = decompress_err(compressed);

    assert!(matches!(err, HuffError::Format(FormatError::TruncatedBody)));
    assert!(!written.is_empty());
    assert!(input.starts_with(&written));
}

#[test]
fn test_truncated_tree_is_rejected() {
    let mut compressed = compress_bytes(b"a tree with several leaves", &Properties::default()).unwrap();
    compressed.truncate(6);

    let (err, _) = decompress_err(compressed);

    assert!(matches!(err, HuffError::Format(FormatError::TruncatedTree)));
}

#[test]
fn test_single_leaf_other_than_eof_is_rejected() {
    let mut writer = BinaryWriter::in_memory();
    writer.write_bits(32, HUFF_TREE).unwrap();
    writer.write_bits(1, 1).unwrap();
    writer.write_bits(LEAF_BITS, 0x41).unwrap();
    writer.write_bits(8, 0).unwrap();

    let (err, written) = decompress_err(writer.into_inner().unwrap());

    assert!(matches!(err, HuffError::Format(FormatError::DegenerateTree(0x41))));
    assert!(written.is_empty());
}

#[test]
fn test_tree_without_eof_runs_out_of_input() {
    let mut writer = BinaryWriter::in_memory();
    writer.write_bits(32, HUFF_TREE).unwrap();
    writer.write_bits(1, 0).unwrap();
    writer.write_bits(1, 1).unwrap();
    writer.write_bits(LEAF_BITS, 0x41).unwrap();
    writer.write_bits(1, 1).unwrap();
    writer.write_bits(LEAF_BITS, 0x42).unwrap();
    writer.write_bits(4, 0b0110).unwrap();

    let (err, written) = decompress_err(writer.into_inner().unwrap());

    assert!(matches!(err, HuffError::Format(FormatError::TruncatedBody)));
    assert!(written.starts_with(b"ABBA"));
}

#[test]
fn test_eof_leaf_in_handcrafted_tree() {
    let mut writer = BinaryWriter::in_memory();
    writer.write_bits(32, HUFF_TREE).unwrap();
    writer.write_bits(1, 0).unwrap();
    writer.write_bits(1, 1).unwrap();
    writer.write_bits(LEAF_BITS, PSEUDO_EOF as u32).unwrap();
    writer.write_bits(1, 1).unwrap();
    writer.write_bits(LEAF_BITS, 0x7A).unwrap();
    writer.write_bits(4, 0b1110).unwrap();

    let decompressed = decompress_bytes(&writer.into_inner().unwrap(), &Properties::default()).unwrap();

    assert_eq!(decompressed, b"zzz");
}

/// Source whose content is replaced by `after_reset` once it is rewound.
struct ShiftingReader {
    reader: BinaryReader<io::Cursor<Vec<u8>>>,
    after_reset: Vec<u8>,
}

impl BitRead for ShiftingReader {
    fn read_bits(&mut self, len: u32) -> io::Result<Option<u32>> {
        self.reader.read_bits(len)
    }

    fn reset(&mut self) -> io::Result<()> {
        let bits_read = self.reader.bits_read();
        self.reader = BinaryReader::from_bytes(std::mem::take(&mut self.after_reset));
        self.reader.read_bits = bits_read;
        Ok(())
    }

    fn bits_read(&self) -> usize {
        self.reader.bits_read()
    }
}

#[test]
fn test_input_changed_between_passes() {
    let mut reader = ShiftingReader {
        reader: BinaryReader::from_bytes(b"aab".to_vec()),
        after_reset: b"abz".to_vec(),
    };
    let mut writer = BinaryWriter::in_memory();

    let err = HuffProcessor::new(Properties::default())
        .compress(&mut reader, &mut writer)
        .unwrap_err();

    assert!(matches!(err, HuffError::InputChanged(0x7A)));
}

#[test]
fn test_deep_header_is_rejected() {
    // Every internal node has a leaf on its left and the next node on its right
    let mut writer = BinaryWriter::in_memory();
    writer.write_bits(32, HUFF_TREE).unwrap();
    for _ in 0..1_000_000 {
        writer.write_bits(1, 0).unwrap();
        writer.write_bits(1, 1).unwrap();
        writer.write_bits(LEAF_BITS, 0x61).unwrap();
    }
    writer.write_bits(1, 1).unwrap();
    writer.write_bits(LEAF_BITS, PSEUDO_EOF as u32).unwrap();

    let (err, written) = decompress_err(writer.into_inner().unwrap());

    assert!(matches!(err, HuffError::Format(FormatError::OversizedTree(MAX_INTERNAL_NODES))));
    assert!(written.is_empty());
}
