//! # Image Scaler - Main Entry Point
//!
//! Punto di ingresso dell'applicazione.
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (percent, directory, quality, workers, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Crea la configurazione e avvia il runner
//! 4. Mappa il risultato sull'exit code: 0 nessun errore, 1 fallimenti
//!    per-file, 2 errori di configurazione o di input
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-scaler --percent 50 --input-dir photos --output-dir photos-small --to-webp
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use image_scaler::{Config, ScaleRunner};

#[derive(Parser)]
#[command(name = "image-scaler")]
#[command(about = "Scale images by a percent and write to an output directory")]
struct Args {
    /// Scale percent (e.g., 50 for half size)
    #[arg(short, long)]
    percent: u32,

    /// Input images directory
    #[arg(long, default_value = "images")]
    input_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "images-scaled")]
    output_dir: PathBuf,

    /// Quality for JPEG/WebP (1-100)
    #[arg(short, long, default_value = "85")]
    quality: u8,

    /// Enable lossless optimizer where supported (JPEG/PNG)
    #[arg(long)]
    optimize: bool,

    /// Strip metadata (EXIF/ICC) for smaller files
    #[arg(long)]
    strip_metadata: bool,

    /// Convert output to WebP format
    #[arg(long)]
    to_webp: bool,

    /// Save WebP losslessly (ignores quality)
    #[arg(long)]
    webp_lossless: bool,

    /// Number of parallel workers (default: CPU count)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Output progress and results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let config = Config {
        percent: args.percent,
        input_dir: args.input_dir,
        output_dir: args.output_dir,
        quality: args.quality,
        optimize: args.optimize,
        strip_metadata: args.strip_metadata,
        convert_to_webp: args.to_webp,
        webp_lossless: args.webp_lossless,
        workers: args.workers,
        json_output: args.json,
    };

    let runner = match ScaleRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    match runner.run().await {
        Ok(summary) if summary.failed() == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}
