// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "qr-capture")]
#[command(about = "Scan frames for a QR code and capture the scan region")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scan session over an image file or a directory of frames
    Scan {
        /// Image file or directory of frame images to scan
        input: PathBuf,

        /// Output file path (default: ~/Pictures/QR Capture/qr_TIMESTAMP.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file overriding the scan policy
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decode a QR code from a single image
    Decode {
        /// Image to decode
        image: PathBuf,
    },

    /// Print the effective scan configuration
    Config {
        /// JSON configuration file to resolve
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=qr_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            input,
            output,
            config,
        } => cli::run_scan(input, output, config),
        Commands::Decode { image } => cli::run_decode(image),
        Commands::Config { config } => cli::show_config(config.as_deref()),
    }
}
