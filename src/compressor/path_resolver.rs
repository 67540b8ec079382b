//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output: ogni file di input viene mappato
//! allo stesso path relativo sotto la directory di output.

use crate::error::CompressError;
use crate::file_manager::{FileTask, MediaClass};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maps input files onto the mirrored output tree
#[derive(Debug, Clone)]
pub struct PathResolver {
    input_root: PathBuf,
    output_root: PathBuf,
}

impl PathResolver {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Build the task for a discovered file
    pub fn resolve(&self, input_path: &Path) -> Result<FileTask, CompressError> {
        let relative_path = input_path
            .strip_prefix(&self.input_root)
            .map_err(|_| {
                CompressError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!(
                        "{} is not under {}",
                        input_path.display(),
                        self.input_root.display()
                    ),
                ))
            })?
            .to_path_buf();

        let output_path = self.output_root.join(&relative_path);
        debug!("Resolved output path: {} -> {}", input_path.display(), output_path.display());

        Ok(FileTask {
            input_path: input_path.to_path_buf(),
            class: MediaClass::from_path(input_path),
            relative_path,
            output_path,
        })
    }

    /// Create the output root and any missing ancestors
    pub async fn ensure_output_root(&self) -> Result<(), CompressError> {
        Self::create_dir_all(&self.output_root).await
    }

    /// Create the parent directories of `path` if needed
    pub async fn ensure_parent_dirs(path: &Path) -> Result<(), CompressError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self::create_dir_all(parent).await,
            _ => Ok(()),
        }
    }

    async fn create_dir_all(dir: &Path) -> Result<(), CompressError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| CompressError::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_preserves_relative_path() {
        let resolver = PathResolver::new("input", "output");
        let task = resolver.resolve(&Path::new("input").join("a").join("b").join("c.png")).unwrap();

        assert_eq!(task.relative_path, Path::new("a").join("b").join("c.png"));
        assert_eq!(task.output_path, Path::new("output").join("a").join("b").join("c.png"));
        assert_eq!(task.class, MediaClass::Image);
    }

    #[test]
    fn test_resolve_keeps_name_and_case() {
        let resolver = PathResolver::new("images", "compressed");
        let task = resolver.resolve(&Path::new("images").join("Clip.AVI")).unwrap();

        assert_eq!(task.output_path, Path::new("compressed").join("Clip.AVI"));
        assert_eq!(task.class, MediaClass::Video);
    }

    #[test]
    fn test_resolve_outside_root_fails() {
        let resolver = PathResolver::new("images", "compressed");
        assert!(resolver.resolve(Path::new("elsewhere/doc.txt")).is_err());
    }

    #[tokio::test]
    async fn test_ensure_parent_dirs_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out").join("a").join("b").join("c.png");

        PathResolver::ensure_parent_dirs(&target).await.unwrap();

        assert!(temp_dir.path().join("out/a/b").is_dir());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_directory_creation_failure_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("compressed");
        std::fs::write(&blocker, b"a file, not a directory").unwrap();

        let err = PathResolver::new(temp_dir.path().join("images"), &blocker)
            .ensure_output_root()
            .await
            .unwrap_err();

        assert!(matches!(err, CompressError::DirectoryCreation { .. }));
        assert!(!err.is_isolated());
    }
}
