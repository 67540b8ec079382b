//! # Media Tree Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Creazione della configurazione e avvio del `TreeCompressor`
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory di input/output, opzioni di report)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Verifica la presenza di ffmpeg (solo warning se assente)
//! 4. Esegue il run; exit code 0 anche con file falliti, salvo `--fail-on-error`
//!
//! ## Esempio di utilizzo:
//! ```bash
//! tree-compressor images compressed --video-timeout 600 --progress
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use media_tree_compressor::config::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use media_tree_compressor::platform::PlatformCommands;
use media_tree_compressor::{Config, OutputFormat, Reporter, TreeCompressor, VideoSettings};

#[derive(Parser)]
#[command(name = "tree-compressor")]
#[command(about = "Mirror a directory tree, re-encoding images and videos at reduced quality")]
struct Args {
    /// Directory to read from
    #[arg(default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// Directory receiving the mirrored tree (created if missing)
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// ffmpeg executable to use for video transcoding
    #[arg(long)]
    ffmpeg: Option<String>,

    /// Give up on a single video after this many seconds
    #[arg(long, value_name = "SECS")]
    video_timeout: Option<u64>,

    /// Emit one JSON object per line instead of plain text
    #[arg(long)]
    json: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,

    /// Exit with status 1 when any file failed to convert
    #[arg(long)]
    fail_on_error: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for the per-file report
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let defaults = Config::default();
    let config = Config {
        input_dir: args.input_dir,
        output_dir: args.output_dir,
        video: VideoSettings {
            timeout_secs: args.video_timeout,
            ..defaults.video
        },
        ffmpeg_program: args.ffmpeg.unwrap_or(defaults.ffmpeg_program),
        image: defaults.image,
    };

    if !PlatformCommands::is_command_available(&config.ffmpeg_program).await {
        warn!(
            "{} was not found, video files will fail to compress",
            config.ffmpeg_program
        );
    }

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let reporter = Reporter::stdout(format, args.progress);

    let mut compressor = TreeCompressor::new(config, reporter)?;
    let summary = compressor.run().await?;

    if args.fail_on_error && summary.failed > 0 {
        info!("{} files failed, exiting with status 1", summary.failed);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
