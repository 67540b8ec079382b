//! # Video Processing Module
//!
//! Questo modulo gestisce la transcodifica dei video tramite un tool esterno.
//!
//! ## Responsabilità:
//! - Definisce la capability `VideoTranscoder` (sostituibile nei test)
//! - Implementa `FfmpegTranscoder`, che invoca ffmpeg come sottoprocesso sincrono
//! - Costruisce gli argomenti fissi di ffmpeg a partire da `VideoSettings`
//!
//! ## Parametri ffmpeg (default):
//! ```text
//! ffmpeg -y -i <input> -c:v libx264 -crf 28 -c:a aac -b:a 128k -strict experimental <output>
//! ```
//!
//! ## Controllo qualità (CRF):
//! - 0-17: Visualmente lossless (file grandi)
//! - 18-23: Alta qualità
//! - 24-28: Buona qualità (default 28, compressione media)
//! - 29+: File piccoli, qualità decrescente
//!
//! ## Gestione errori:
//! - stdout e stderr sono catturati, mai inoltrati alla console
//! - exit status diverso da zero → `CompressError::FFmpeg` con le ultime righe di stderr
//! - eseguibile mancante → `CompressError::Spawn`
//! - timeout configurato superato → il processo viene terminato, `CompressError::Timeout`
//!
//! Senza `timeout_secs` un processo bloccato blocca l'intero run: non esiste
//! altra forma di cancellazione.

use crate::config::VideoSettings;
use crate::error::CompressError;
use std::ffi::OsString;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

/// Number of trailing stderr lines kept in the failure message
const STDERR_TAIL_LINES: usize = 5;

/// Capability to transcode one video file
pub trait VideoTranscoder {
    /// Transcode `input_path` into `output_path`, returning once the work is finished
    fn transcode(
        &self,
        input_path: &Path,
        output_path: &Path,
        settings: &VideoSettings,
    ) -> impl Future<Output = Result<(), CompressError>> + Send;
}

/// Transcoder backed by the ffmpeg command-line tool
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list passed to ffmpeg
    pub fn build_args(input_path: &Path, output_path: &Path, settings: &VideoSettings) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-i".into(),
            input_path.as_os_str().to_owned(),
            "-c:v".into(),
            settings.video_codec.as_str().into(),
            "-crf".into(),
            settings.crf.to_string().into(),
            "-c:a".into(),
            settings.audio_codec.as_str().into(),
            "-b:a".into(),
            settings.audio_bitrate().into(),
        ];

        if settings.allow_experimental {
            args.push("-strict".into());
            args.push("experimental".into());
        }

        args.push(output_path.as_os_str().to_owned());
        args
    }

    fn stderr_tail(stderr: &[u8]) -> String {
        let text = String::from_utf8_lossy(stderr);
        let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join(" | ")
    }

    async fn run(&self, input_path: &Path, output_path: &Path, settings: &VideoSettings) -> Result<(), CompressError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::build_args(input_path, output_path, settings))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start_time = Instant::now();
        let output = cmd.output().await.map_err(|source| CompressError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        debug!(
            "{} finished in {:.1}s with {}",
            self.program,
            start_time.elapsed().as_secs_f64(),
            output.status
        );

        if !output.status.success() {
            debug!("{} stderr:\n{}", self.program, String::from_utf8_lossy(&output.stderr));
            return Err(CompressError::FFmpeg {
                status: output.status.to_string(),
                stderr: Self::stderr_tail(&output.stderr),
            });
        }

        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(crate::platform::PlatformCommands::ffmpeg())
    }
}

impl VideoTranscoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        input_path: &Path,
        output_path: &Path,
        settings: &VideoSettings,
    ) -> Result<(), CompressError> {
        debug!(
            "Transcoding {} (CRF: {}, audio: {})",
            input_path.display(),
            settings.crf,
            settings.audio_bitrate()
        );

        match settings.timeout() {
            // Dropping the timed-out future kills the child
            Some(limit) => tokio::time::timeout(limit, self.run(input_path, output_path, settings))
                .await
                .map_err(|_| CompressError::Timeout(limit))?,
            None => self.run(input_path, output_path, settings).await,
        }
    }
}
