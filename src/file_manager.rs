//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file e le operazioni verbatim.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di tutti i file regolari sotto la directory di input
//! - Classificazione (immagine, video, altro) per suffisso, case-insensitive
//! - Copia byte-per-byte dei file non media
//! - Utilità per dimensioni e percentuali
//!
//! ## Regola di classificazione (primo match vince):
//! - **Immagini**: `.jpg`, `.jpeg`, `.png`
//! - **Video**: `.mp4`, `.avi`
//! - **Altro**: tutto il resto (copiato verbatim)
//!
//! L'ordine di enumerazione è quello naturale del filesystem e non è garantito
//! ordinato.

use crate::error::CompressError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png"];
const VIDEO_SUFFIXES: &[&str] = &[".mp4", ".avi"];

/// Handler class of a discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaClass {
    Image,
    Video,
    Other,
}

impl MediaClass {
    /// Classify a path by its case-insensitive suffix
    pub fn from_path(path: &Path) -> Self {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_lowercase(),
            None => return MediaClass::Other,
        };

        if IMAGE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            MediaClass::Image
        } else if VIDEO_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            MediaClass::Video
        } else {
            MediaClass::Other
        }
    }
}

/// One file of the input tree, mapped to its mirrored destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input_path: PathBuf,
    pub relative_path: PathBuf,
    pub output_path: PathBuf,
    pub class: MediaClass,
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find every regular file under `input_dir`.
    ///
    /// A missing or unreadable root yields no files. Directories whose canonical
    /// path equals `exclude_dir` are not descended into.
    pub fn find_files(input_dir: &Path, exclude_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let walker = WalkDir::new(input_dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                let excluded = entry.file_type().is_dir()
                    && exclude_dir.map_or(false, |excluded| Self::same_dir(entry.path(), excluded));
                if excluded {
                    debug!("Skipping output directory inside input: {}", entry.path().display());
                }
                !excluded
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if is_file {
                files.push(entry.into_path());
            }
        }

        files
    }

    fn same_dir(candidate: &Path, canonical: &Path) -> bool {
        candidate
            .canonicalize()
            .map(|path| path == canonical)
            .unwrap_or(false)
    }

    /// Copy file content byte-for-byte. Permissions and timestamps are not guaranteed.
    ///
    /// Copying a file onto itself is refused: the destination would be truncated first.
    pub async fn copy_file(input_path: &Path, output_path: &Path) -> Result<u64, CompressError> {
        if Self::is_same_file(input_path, output_path) {
            return Err(CompressError::Copy {
                from: input_path.to_path_buf(),
                to: output_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "source and destination are the same file",
                ),
            });
        }

        fs::copy(input_path, output_path)
            .await
            .map_err(|source| CompressError::Copy {
                from: input_path.to_path_buf(),
                to: output_path.to_path_buf(),
                source,
            })
    }

    /// Whether both paths resolve to the same existing file
    pub fn is_same_file(a: &Path, b: &Path) -> bool {
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Size of a file, zero when it cannot be read
    pub async fn file_size(path: &Path) -> u64 {
        fs::metadata(path).await.map(|m| m.len()).unwrap_or(0)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
