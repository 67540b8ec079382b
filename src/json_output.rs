//! # JSON Output Module
//!
//! Questo modulo definisce i messaggi JSON (uno per riga) emessi con `--json`,
//! pensati per chi consuma l'output del compressore da un altro processo.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run (directory, numero file, parametri di codifica)
//! - `file_complete`: Fine elaborazione di un file (classe, path, dimensioni, errore)
//! - `complete`: Fine del run con le statistiche finali

use crate::config::{ImageSettings, VideoSettings};
use crate::error::CompressError;
use crate::file_manager::MediaClass;
use crate::progress::RunSummary;
use serde::Serialize;
use std::path::Path;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage<'a> {
    /// Inizio del run
    Start {
        input_dir: &'a Path,
        output_dir: &'a Path,
        total_files: usize,
        image: &'a ImageSettings,
        video: &'a VideoSettings,
    },

    /// Fine elaborazione di un file
    FileComplete {
        class: MediaClass,
        input: &'a Path,
        output: &'a Path,
        original_size: u64,
        output_size: u64,
        reduction_percent: f64,
        error: Option<&'a CompressError>,
    },

    /// Run completato
    Complete {
        #[serde(flatten)]
        summary: &'a RunSummary,
        duration_seconds: f64,
    },
}

impl JsonMessage<'_> {
    /// Serialise to a single line
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_start_message_shape() {
        let image = ImageSettings::default();
        let video = VideoSettings::default();
        let line = JsonMessage::Start {
            input_dir: Path::new("images"),
            output_dir: Path::new("compressed"),
            total_files: 3,
            image: &image,
            video: &video,
        }
        .to_line()
        .unwrap();

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "start");
        assert_eq!(value["total_files"], 3);
        assert_eq!(value["image"]["quality"], 20);
        assert_eq!(value["video"]["crf"], 28);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_file_complete_carries_error_text() {
        let error = CompressError::UnsupportedFormat("photo.gif".to_string());
        let line = JsonMessage::FileComplete {
            class: MediaClass::Image,
            input: Path::new("images/photo.jpg"),
            output: Path::new("compressed/photo.jpg"),
            original_size: 100,
            output_size: 0,
            reduction_percent: 0.0,
            error: Some(&error),
        }
        .to_line()
        .unwrap();

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "file_complete");
        assert_eq!(value["class"], "image");
        assert_eq!(value["error"], "Unsupported image format: photo.gif");
    }

    #[test]
    fn test_complete_flattens_summary() {
        let summary = RunSummary {
            images: 2,
            failed: 1,
            ..Default::default()
        };
        let line = JsonMessage::Complete {
            summary: &summary,
            duration_seconds: 1.5,
        }
        .to_line()
        .unwrap();

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["images"], 2);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["duration_seconds"], 1.5);
    }
}
