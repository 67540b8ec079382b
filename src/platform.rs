//! # Platform-specific utilities
//!
//! Questo modulo centralizza la risoluzione cross-platform dell'eseguibile
//! ffmpeg e la verifica della sua presenza nel sistema.

use std::path::Path;
use tracing::debug;

/// Platform-specific command names
pub struct PlatformCommands;

impl PlatformCommands {
    /// Executable name of the video transcoder on this platform
    pub fn ffmpeg() -> &'static str {
        if cfg!(windows) {
            "ffmpeg.exe"
        } else {
            "ffmpeg"
        }
    }

    /// Command used to check if a program exists
    pub fn which_command() -> &'static str {
        if cfg!(windows) {
            "where"
        } else {
            "which"
        }
    }

    /// Check if a command is available, either as an explicit path or on PATH
    pub async fn is_command_available(command: &str) -> bool {
        let as_path = Path::new(command);
        if as_path.components().count() > 1 {
            return as_path.is_file();
        }

        let result = tokio::process::Command::new(Self::which_command())
            .arg(command)
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("Could not run {}: {}", Self::which_command(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_commands() {
        assert!(PlatformCommands::ffmpeg().starts_with("ffmpeg"));
        assert!(!PlatformCommands::which_command().is_empty());
    }

    #[tokio::test]
    async fn test_missing_explicit_path_is_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("bin").join("ffmpeg");
        assert!(!PlatformCommands::is_command_available(missing.to_str().unwrap()).await);
    }

    #[tokio::test]
    async fn test_command_availability_does_not_panic() {
        // Minimal environments may lack `which`, so only the call itself is checked
        let _ = PlatformCommands::is_command_available("ffmpeg").await;
    }
}
