//! # Configuration Management Module
//!
//! Questo modulo raccoglie tutta la configurazione del compressore in un'unica
//! struttura esplicita, costruita una volta all'avvio e passata per valore al
//! `TreeCompressor`. Non esiste stato globale mutabile.
//!
//! ## Parametri di configurazione:
//! - `input_dir`: Directory sorgente (default: "images")
//! - `output_dir`: Directory di output speculare (default: "compressed")
//! - `image.quality`: Qualità lossy immagini (0-100, default: 20)
//! - `image.optimize`: Ri-compattazione degli stream compressi (default: true)
//! - `video.video_codec`: Codec video (default: "libx264")
//! - `video.crf`: CRF video (0-51, default: 28, più basso = migliore qualità)
//! - `video.audio_codec`: Codec audio (default: "aac")
//! - `video.audio_bitrate_kbps`: Bitrate audio (default: 128)
//! - `video.allow_experimental`: Passa `-strict experimental` a ffmpeg (default: true)
//! - `video.timeout_secs`: Tempo massimo per transcodifica (default: None = nessun limite)
//! - `ffmpeg_program`: Eseguibile ffmpeg (default: dipendente dalla piattaforma)
//!
//! ## Esempio:
//! ```rust
//! use media_tree_compressor::Config;
//!
//! let config = Config {
//!     input_dir: "photos".into(),
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! ```

use crate::error::CompressError;
use crate::platform::PlatformCommands;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default input directory
pub const DEFAULT_INPUT_DIR: &str = "images";
/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "compressed";

/// Still-image encoding parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Lossy quality (0-100, higher = larger file)
    pub quality: u8,
    /// Re-pack compressed streams where the format allows it
    pub optimize: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            quality: 20,
            optimize: true,
        }
    }
}

/// Video transcoding parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSettings {
    pub video_codec: String,
    /// Constant rate factor (0-51, lower = better quality)
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate_kbps: u32,
    pub allow_experimental: bool,
    /// Upper bound for a single transcode, `None` waits forever
    pub timeout_secs: Option<u64>,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            crf: 28,
            audio_codec: "aac".to_string(),
            audio_bitrate_kbps: 128,
            allow_experimental: true,
            timeout_secs: None,
        }
    }
}

impl VideoSettings {
    /// Audio bitrate in ffmpeg notation, e.g. `128k`
    pub fn audio_bitrate(&self) -> String {
        format!("{}k", self.audio_bitrate_kbps)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Configuration for a compression run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub image: ImageSettings,
    pub video: VideoSettings,
    /// Program invoked for video transcoding
    pub ffmpeg_program: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            image: ImageSettings::default(),
            video: VideoSettings::default(),
            ffmpeg_program: PlatformCommands::ffmpeg().to_string(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), CompressError> {
        if self.image.quality > 100 {
            return Err(CompressError::Validation(
                "Image quality must be between 0 and 100".to_string(),
            ));
        }

        if self.video.crf > 51 {
            return Err(CompressError::Validation(
                "Video CRF must be between 0 and 51".to_string(),
            ));
        }

        if self.video.audio_bitrate_kbps == 0 {
            return Err(CompressError::Validation(
                "Audio bitrate must be greater than 0".to_string(),
            ));
        }

        if self.video.video_codec.is_empty() || self.video.audio_codec.is_empty() {
            return Err(CompressError::Validation(
                "Video and audio codecs must be named".to_string(),
            ));
        }

        if self.video.timeout_secs == Some(0) {
            return Err(CompressError::Validation(
                "Video timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.ffmpeg_program.trim().is_empty() {
            return Err(CompressError::Validation(
                "ffmpeg program must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
