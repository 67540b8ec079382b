//! # Error Types Module
//!
//! Questo modulo definisce la tassonomia degli errori del compressore.
//!
//! ## Categorie di errori:
//! - `Image` / `UnsupportedFormat`: immagine illeggibile, corrotta o formato non gestito
//! - `FFmpeg`: il transcoder è uscito con stato diverso da zero
//! - `Spawn`: il transcoder non è stato avviato (eseguibile mancante, permessi)
//! - `Timeout`: il transcoder ha superato il tempo massimo configurato
//! - `Copy`: copia verbatim fallita
//! - `DirectoryCreation`: creazione directory di output fallita
//! - `Io`: altri errori di I/O
//! - `Validation`: configurazione non valida
//!
//! ## Politica di propagazione:
//! Gli errori di conversione media sono isolati per singolo file (loggati, il run
//! continua). Gli errori di filesystem (copia, mkdir) sono fatali per l'intero run.
//! `CompressError::is_isolated()` è l'unico punto in cui questa regola è codificata.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while compressing a tree
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("ffmpeg exited with {status}: {stderr}")]
    FFmpeg {
        status: String,
        stderr: String,
    },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transcode timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl CompressError {
    /// Whether the failure stays confined to the file that caused it.
    ///
    /// Conversions are best-effort; filesystem setup and verbatim copies are not.
    pub fn is_isolated(&self) -> bool {
        matches!(
            self,
            CompressError::Image(_)
                | CompressError::UnsupportedFormat(_)
                | CompressError::FFmpeg { .. }
                | CompressError::Spawn { .. }
                | CompressError::Timeout(_)
        )
    }
}

// Errors travel inside JSON events as plain strings
impl Serialize for CompressError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_errors_are_isolated() {
        assert!(CompressError::UnsupportedFormat("gif".to_string()).is_isolated());
        assert!(CompressError::Timeout(Duration::from_secs(3)).is_isolated());
        assert!(CompressError::FFmpeg {
            status: "exit status: 1".to_string(),
            stderr: "Invalid data found when processing input".to_string(),
        }
        .is_isolated());
    }

    #[test]
    fn test_filesystem_errors_are_fatal() {
        let copy = CompressError::Copy {
            from: PathBuf::from("images/doc.txt"),
            to: PathBuf::from("compressed/doc.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!copy.is_isolated());

        let mkdir = CompressError::DirectoryCreation {
            path: PathBuf::from("compressed/a"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(!mkdir.is_isolated());
        assert!(!CompressError::Validation("crf".to_string()).is_isolated());
    }

    #[test]
    fn test_error_serializes_as_message() {
        let err = CompressError::Timeout(Duration::from_secs(90));
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Transcode timed out after 90s\"");
    }
}
