//! # Progress Tracking and Reporting Module
//!
//! Questo modulo gestisce il report per-file, le statistiche del run e la
//! progress bar opzionale.
//!
//! ## Componenti principali:
//! - `Reporter`: emette una riga per file (testo o JSON) su stdout
//! - `ProgressManager`: progress bar `indicatif` su stderr (`--progress`)
//! - `RunSummary`: contatori cumulativi (immagini, video, copie, errori, byte)
//!
//! ## Formato testo (una riga per file):
//! ```text
//! Compressed image: compressed/photo.png
//! Compressed video: compressed/video.mp4
//! Copied file: compressed/doc.txt
//! Failed to compress image: images/broken.png, Error: <descrizione>
//! Failed to compress video: images/broken.mp4, Error: <descrizione>
//! ```
//!
//! In modalità testo non viene stampato alcun riepilogo su stdout; il
//! riepilogo finisce nel log.

use crate::config::Config;
use crate::error::CompressError;
use crate::file_manager::{FileManager, FileTask, MediaClass};
use crate::json_output::JsonMessage;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::warn;

/// Manages progress reporting for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance by one file
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Print a line above the bar without tearing it
    pub fn println(&self, line: &str) {
        self.bar.println(line);
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics for a single run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub images: usize,
    pub videos: usize,
    pub copied: usize,
    pub failed: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &FileReport<'_>) {
        self.bytes_in += report.original_size;

        if report.error.is_some() {
            self.failed += 1;
            return;
        }

        self.bytes_out += report.output_size;
        match report.task.class {
            MediaClass::Image => self.images += 1,
            MediaClass::Video => self.videos += 1,
            MediaClass::Other => self.copied += 1,
        }
    }

    pub fn files_processed(&self) -> usize {
        self.images + self.videos + self.copied + self.failed
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Images: {} | Videos: {} | Copied: {} | Failed: {} | {} -> {}",
            self.files_processed(),
            self.images,
            self.videos,
            self.copied,
            self.failed,
            FileManager::format_size(self.bytes_in),
            FileManager::format_size(self.bytes_out),
        )
    }
}

/// Outcome of one file, as reported to the user
#[derive(Debug)]
pub struct FileReport<'a> {
    pub task: &'a FileTask,
    pub original_size: u64,
    pub output_size: u64,
    pub error: Option<&'a CompressError>,
}

impl fmt::Display for FileReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let task = self.task;
        match (task.class, self.error) {
            (MediaClass::Image, None) => write!(f, "Compressed image: {}", task.output_path.display()),
            (MediaClass::Video, None) => write!(f, "Compressed video: {}", task.output_path.display()),
            (MediaClass::Other, None) => write!(f, "Copied file: {}", task.output_path.display()),
            (MediaClass::Image, Some(e)) => {
                write!(f, "Failed to compress image: {}, Error: {}", task.input_path.display(), e)
            }
            (MediaClass::Video, Some(e)) => {
                write!(f, "Failed to compress video: {}, Error: {}", task.input_path.display(), e)
            }
            // Copy failures are fatal and never reported per file; kept for exhaustiveness
            (MediaClass::Other, Some(e)) => {
                write!(f, "Failed to copy file: {}, Error: {}", task.input_path.display(), e)
            }
        }
    }
}

/// Report line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

enum Sink {
    Stdout,
    Memory(Vec<String>),
}

/// Writes one line per file, plus start/complete events in JSON mode
pub struct Reporter {
    format: OutputFormat,
    show_progress: bool,
    progress: Option<ProgressManager>,
    sink: Sink,
    started_at: Instant,
}

impl Reporter {
    /// Reporter printing to stdout
    pub fn stdout(format: OutputFormat, show_progress: bool) -> Self {
        Self {
            format,
            show_progress,
            progress: None,
            sink: Sink::Stdout,
            started_at: Instant::now(),
        }
    }

    /// Reporter keeping lines in memory, see [`Reporter::lines`]
    pub fn in_memory(format: OutputFormat) -> Self {
        Self {
            format,
            show_progress: false,
            progress: None,
            sink: Sink::Memory(Vec::new()),
            started_at: Instant::now(),
        }
    }

    /// Lines captured by an in-memory reporter
    pub fn lines(&self) -> &[String] {
        match &self.sink {
            Sink::Memory(lines) => lines,
            Sink::Stdout => &[],
        }
    }

    pub fn start(&mut self, config: &Config, total_files: usize) {
        self.started_at = Instant::now();

        if self.show_progress {
            self.progress = Some(ProgressManager::new(total_files as u64));
        }

        if self.format == OutputFormat::Json {
            let message = JsonMessage::Start {
                input_dir: &config.input_dir,
                output_dir: &config.output_dir,
                total_files,
                image: &config.image,
                video: &config.video,
            };
            self.emit_json(&message);
        }
    }

    pub fn file(&mut self, report: &FileReport<'_>) {
        match self.format {
            OutputFormat::Text => self.emit(report.to_string()),
            OutputFormat::Json => {
                let reduction_percent = if report.error.is_some() {
                    0.0
                } else {
                    FileManager::calculate_reduction(report.original_size, report.output_size)
                };
                let message = JsonMessage::FileComplete {
                    class: report.task.class,
                    input: &report.task.input_path,
                    output: &report.task.output_path,
                    original_size: report.original_size,
                    output_size: report.output_size,
                    reduction_percent,
                    error: report.error,
                };
                self.emit_json(&message);
            }
        }

        if let Some(progress) = &self.progress {
            progress.update(&report.task.relative_path.display().to_string());
        }
    }

    pub fn finish(&mut self, summary: &RunSummary) {
        if self.format == OutputFormat::Json {
            let message = JsonMessage::Complete {
                summary,
                duration_seconds: self.started_at.elapsed().as_secs_f64(),
            };
            self.emit_json(&message);
        }

        if let Some(progress) = self.progress.take() {
            progress.finish(&summary.format_summary());
        }
    }

    fn emit_json(&mut self, message: &JsonMessage<'_>) {
        match message.to_line() {
            Ok(line) => self.emit(line),
            Err(e) => warn!("Failed to serialise report event: {}", e),
        }
    }

    fn emit(&mut self, line: String) {
        match &mut self.sink {
            Sink::Memory(lines) => lines.push(line),
            Sink::Stdout => match &self.progress {
                Some(progress) => progress.println(&line),
                None => println!("{}", line),
            },
        }
    }
}
