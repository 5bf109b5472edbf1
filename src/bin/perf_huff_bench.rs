use std::hint::black_box;

use clap::Parser;
use rand::Rng;
use huff_processor::{compress_bytes, decompress_bytes, utils::Timer, Properties};

#[derive(Parser, Debug)]
#[command(about = "Time compression and decompression of random inputs")]
struct Args {
    /// Number of runs
    #[arg(short, long, default_value_t = 10)]
    runs: usize,
    /// Size of every input in bytes
    #[arg(short, long, default_value_t = 1 << 20)]
    size: usize,
    /// Number of distinct byte values in the inputs
    #[arg(short, long, default_value_t = 64)]
    alphabet: u16,
}

fn gen_input(size: usize, alphabet: u16) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let alphabet = alphabet.clamp(1, 256);
    // Squaring a uniform draw skews the distribution towards low symbols
    (0..size)
        .map(|_| {
            let x: f64 = rng.gen();
            ((x * x) * alphabet as f64) as u8
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let props = Properties::default();

    let mut comp_timer = Timer::new();
    let mut decomp_timer = Timer::new();
    let mut compressed_bytes = 0;

    for _ in 0..args.runs {
        let input = gen_input(args.size, args.alphabet);

        comp_timer.start();
        let compressed = black_box(compress_bytes(&input, &props)?);
        comp_timer.stop();

        decomp_timer.start();
        let decompressed = black_box(decompress_bytes(&compressed, &props)?);
        decomp_timer.stop();

        assert_eq!(decompressed, input, "round trip mismatch");
        compressed_bytes += compressed.len();
    }

    let ratio = compressed_bytes as f64 / (args.size * args.runs.max(1)) as f64;
    println!("average compression time: {}ns", comp_timer.average());
    println!("average decompression time: {}ns", decomp_timer.average());
    println!("average compression ratio: {:.4}", ratio);

    Ok(())
}
