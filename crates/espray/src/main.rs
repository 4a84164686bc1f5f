//! espray - inspect ESP-IDF firmware artifacts
//!
//! Usage:
//!   espray image <file>              Show an app or bootloader image header
//!   espray partitions <file>         List a partition table
//!   espray kind <file>               Classify a flash artifact
//!   espray convert --from hexa --to text <text>
//!   espray dump <file> -e hexa       Render raw bytes through the codec
//!   espray flash-args <build-dir>    Inspect every file in flasher_args.json

mod commands;
mod manifest;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use espray_codec::{check_encoding, Encoding};
use espray_formats::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "espray")]
#[command(about = "Inspect ESP firmware images, bootloaders and partition tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header and description of an app or bootloader image
    Image {
        /// Path to the image file
        file: PathBuf,
        /// Parse as a bootloader image
        #[arg(long, conflicts_with = "app")]
        bootloader: bool,
        /// Parse as an app image
        #[arg(long)]
        app: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// List every segment header
        #[arg(long)]
        segments: bool,
    },
    /// List the entries of a partition table
    Partitions {
        /// Path to the partition table binary
        file: PathBuf,
        /// Print JSON instead of text
        #[arg(long, conflicts_with = "csv")]
        json: bool,
        /// Print the ESP-IDF CSV format
        #[arg(long)]
        csv: bool,
    },
    /// Classify a file as app, bootloader, partition-table or other
    Kind {
        /// Path to the file
        file: PathBuf,
        /// Flash offset the file is written to
        #[arg(short, long, value_parser = parse_hex)]
        offset: Option<u32>,
    },
    /// Re-encode text from one encoding into another
    Convert {
        /// Source encoding
        #[arg(short, long, value_parser = parse_encoding)]
        from: Encoding,
        /// Target encoding
        #[arg(short, long, value_parser = parse_encoding)]
        to: Encoding,
        /// Zero-pad digit tokens to the full byte width
        #[arg(long)]
        pad: bool,
        /// Token separator (defaults to a space for digit encodings)
        #[arg(long)]
        separator: Option<String>,
        /// Wrap base64 output at 76 columns
        #[arg(long)]
        wrap: bool,
        /// Input text, or `-` for stdin
        text: String,
    },
    /// Render a byte range of a file in one of the codec encodings
    Dump {
        /// Path to the file
        file: PathBuf,
        /// Output encoding
        #[arg(short, long, value_parser = parse_encoding, default_value = "hexa")]
        encoding: Encoding,
        /// Start offset
        #[arg(long, value_parser = parse_hex, default_value = "0")]
        offset: u32,
        /// Number of bytes (defaults to the rest of the file)
        #[arg(short, long)]
        length: Option<usize>,
        /// Zero-pad digit tokens to the full byte width
        #[arg(long)]
        pad: bool,
    },
    /// Inspect the artifacts listed in an ESP-IDF flasher_args.json
    FlashArgs {
        /// Build directory containing flasher_args.json
        dir: PathBuf,
    },
}

fn parse_hex(s: &str) -> Result<u32, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u32::from_str_radix(s, 16).map_err(|e| e.to_string())
}

fn parse_encoding(s: &str) -> Result<Encoding, String> {
    check_encoding(s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Image {
            file,
            bootloader,
            app,
            json,
            segments,
        } => {
            let forced = commands::image::forced_kind(app, bootloader);
            commands::image::handle_image_command(&file, forced, json, segments)
        }
        Commands::Partitions { file, json, csv } => {
            commands::partitions::handle_partitions_command(&file, json, csv)
        }
        Commands::Kind { file, offset } => commands::kind::handle_kind_command(&file, offset),
        Commands::Convert {
            from,
            to,
            pad,
            separator,
            wrap,
            text,
        } => commands::convert::handle_convert_command(&text, from, to, pad, separator, wrap),
        Commands::Dump {
            file,
            encoding,
            offset,
            length,
            pad,
        } => commands::dump::handle_dump_command(&file, encoding, offset as usize, length, pad),
        Commands::FlashArgs { dir } => commands::flash_args::handle_flash_args_command(&dir),
    }
}

/// Parse errors are printed as `error[Kind]: detail`; anything else with its
/// context chain.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ParseError>() {
        Some(parse) => eprintln!("error[{}]: {}", parse.kind(), parse),
        None => eprintln!("error: {err:#}"),
    }
}
