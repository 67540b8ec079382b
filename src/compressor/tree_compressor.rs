//! # Tree Compressor
//!
//! Orchestratore del run: percorre la directory di input e produce l'albero
//! speculare in output.
//!
//! ## Flusso di esecuzione:
//! 1. Crea la directory di output (fatale se fallisce)
//! 2. Enumera tutti i file regolari sotto l'input (ordine del filesystem)
//! 3. Per ogni file calcola path relativo e di destinazione, crea le directory
//! 4. Classifica per suffisso e smista a encoder immagini, transcoder video o copia
//! 5. Riporta una riga per file e passa al successivo
//!
//! ## Politica errori:
//! - Errori di conversione (immagine, video) → riportati, il run continua
//! - Errori di copia o creazione directory → propagati, il run termina
//!
//! L'esecuzione è strettamente sequenziale: un file è completato (incluso
//! l'attesa del sottoprocesso video) prima di iniziare il successivo. Un run
//! interrotto lascia l'output parzialmente popolato.

use crate::{
    compressor::path_resolver::PathResolver,
    config::Config,
    error::CompressError,
    file_manager::{FileManager, FileTask, MediaClass},
    image_processor::ImageProcessor,
    progress::{FileReport, OutputFormat, Reporter, RunSummary},
    video_processor::{FfmpegTranscoder, VideoTranscoder},
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Mirrors an input tree into an output tree, re-encoding media on the way
pub struct TreeCompressor<T = FfmpegTranscoder> {
    config: Config,
    image_processor: ImageProcessor,
    transcoder: T,
    reporter: Reporter,
}

impl TreeCompressor<FfmpegTranscoder> {
    /// Compressor using the ffmpeg program named in the configuration
    pub fn new(config: Config, reporter: Reporter) -> Result<Self, CompressError> {
        let transcoder = FfmpegTranscoder::new(config.ffmpeg_program.clone());
        Self::with_transcoder(config, transcoder, reporter)
    }
}

impl<T: VideoTranscoder> TreeCompressor<T> {
    pub fn with_transcoder(config: Config, transcoder: T, reporter: Reporter) -> Result<Self, CompressError> {
        config.validate()?;

        Ok(Self {
            image_processor: ImageProcessor::new(config.image.clone()),
            config,
            transcoder,
            reporter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Run over the whole input tree.
    ///
    /// Returns `Err` only for fatal failures; per-file media failures are counted
    /// in the returned summary.
    pub async fn run(&mut self) -> Result<RunSummary, CompressError> {
        let input_dir = self.config.input_dir.clone();
        let output_dir = self.config.output_dir.clone();

        info!(
            "Compressing {} -> {} (image quality: {}, video CRF: {}, audio: {} {})",
            input_dir.display(),
            output_dir.display(),
            self.config.image.quality,
            self.config.video.crf,
            self.config.video.audio_codec,
            self.config.video.audio_bitrate()
        );
        if let Some(limit) = self.config.video.timeout() {
            info!("Video transcodes are limited to {}s each", limit.as_secs());
        }

        let resolver = PathResolver::new(&input_dir, &output_dir);
        resolver.ensure_output_root().await?;

        if !input_dir.is_dir() {
            warn!("Input directory does not exist: {}", input_dir.display());
        }

        let output_canonical = output_dir.canonicalize().ok();
        if let (Ok(input), Some(output)) = (input_dir.canonicalize(), output_canonical.as_ref()) {
            if input == *output {
                return Err(CompressError::Validation(format!(
                    "Output directory {} is the input directory",
                    output_dir.display()
                )));
            }
        }

        let files = FileManager::find_files(&input_dir, output_canonical.as_deref());
        info!("Found {} files to process", files.len());

        self.reporter.start(&self.config, files.len());
        let mut summary = RunSummary::new();

        // The reporter is finished on the fatal path too
        let outcome = self.process_all(files, &resolver, &mut summary).await;
        self.reporter.finish(&summary);
        outcome?;

        info!("{}", summary.format_summary());
        Ok(summary)
    }

    async fn process_all(
        &mut self,
        files: Vec<PathBuf>,
        resolver: &PathResolver,
        summary: &mut RunSummary,
    ) -> Result<(), CompressError> {
        for file in files {
            let task = resolver.resolve(&file)?;
            PathResolver::ensure_parent_dirs(&task.output_path).await?;

            let original_size = FileManager::file_size(&task.input_path).await;
            match self.process(&task).await {
                Ok(()) => {
                    let output_size = FileManager::file_size(&task.output_path).await;
                    let report = FileReport {
                        task: &task,
                        original_size,
                        output_size,
                        error: None,
                    };
                    summary.record(&report);
                    self.reporter.file(&report);
                }
                Err(e) if e.is_isolated() => {
                    debug!("Isolated failure for {}: {:?}", task.input_path.display(), e);
                    let report = FileReport {
                        task: &task,
                        original_size,
                        output_size: 0,
                        error: Some(&e),
                    };
                    summary.record(&report);
                    self.reporter.file(&report);
                }
                Err(e) => {
                    warn!("Aborting run on {}: {}", task.input_path.display(), e);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    async fn process(&self, task: &FileTask) -> Result<(), CompressError> {
        match task.class {
            MediaClass::Image => {
                self.image_processor
                    .optimize(&task.input_path, &task.output_path)
                    .await
            }
            MediaClass::Video => {
                self.transcoder
                    .transcode(&task.input_path, &task.output_path, &self.config.video)
                    .await
            }
            MediaClass::Other => {
                FileManager::copy_file(&task.input_path, &task.output_path).await?;
                Ok(())
            }
        }
    }
}

/// Compress `input_dir` into `output_dir` with default settings, reporting to stdout
pub async fn run(
    input_dir: impl Into<std::path::PathBuf>,
    output_dir: impl Into<std::path::PathBuf>,
) -> Result<RunSummary, CompressError> {
    let config = Config {
        input_dir: input_dir.into(),
        output_dir: output_dir.into(),
        ..Default::default()
    };

    TreeCompressor::new(config, Reporter::stdout(OutputFormat::Text, false))?
        .run()
        .await
}
