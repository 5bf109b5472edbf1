use std::{error::Error, fs::{self, File}, path::{Path, PathBuf}};

use clap::{Parser, Subcommand};
use log::info;
use huff_processor::{bitstreams::{BinaryReader, BinaryWriter}, utils::Timer, CompressionStats, HuffProcessor, Properties};

#[derive(Parser, Debug)]
#[command(about = "Compress and decompress files with a Huffman code built from their own bytes")]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Properties file holding the run settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log the tree, the code table and the bit counts
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,
    /// Store the run statistics in <DEST_NAME>.stats.json
    #[arg(short, long, global = true, default_value_t = false)]
    stats: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file
    Compress {
        /// The file to compress
        source_name: PathBuf,
        /// The compressed file
        dest_name: PathBuf,
    },
    /// Decompress a file produced by `compress`
    Decompress {
        /// The compressed file
        source_name: PathBuf,
        /// The restored file
        dest_name: PathBuf,
    },
}

fn write_stats(dest_name: &Path, stats: &CompressionStats) -> Result<(), Box<dyn Error>> {
    let stats_name = format!("{}.stats.json", dest_name.display());
    fs::write(&stats_name, serde_json::to_string_pretty(stats)?)?;
    info!("stats written to {}", stats_name);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut props = match &args.config {
        Some(path) => Properties::load(path)?,
        None => Properties::default(),
    };
    props.debug |= args.debug;
    props.write_stats |= args.stats;

    let default_filter = if props.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let processor = HuffProcessor::new(props);
    let mut timer = Timer::new();

    let (stats, dest_name, action) = match &args.command {
        Command::Compress { source_name, dest_name } => {
            let mut reader = BinaryReader::new(File::open(source_name)?);
            let mut writer = BinaryWriter::new(File::create(dest_name)?);
            timer.start();
            (processor.compress(&mut reader, &mut writer)?, dest_name, "compressed")
        }
        Command::Decompress { source_name, dest_name } => {
            let mut reader = BinaryReader::new(File::open(source_name)?);
            let mut writer = BinaryWriter::new(File::create(dest_name)?);
            timer.start();
            (processor.decompress(&mut reader, &mut writer)?, dest_name, "decompressed")
        }
    };
    let elapsed = timer.stop();

    info!("{} {} in {}ns", action, dest_name.display(), elapsed);

    if props.write_stats {
        write_stats(dest_name, &stats)?;
    }

    Ok(())
}
