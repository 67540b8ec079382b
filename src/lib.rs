//! # Media Tree Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione esplicita con i valori di default
//! - `error`: Tassonomia degli errori e politica di isolamento
//! - `file_manager`: Discovery, classificazione e copia verbatim
//! - `image_processor`: Ricodifica immagini (JPEG/PNG)
//! - `video_processor`: Transcodifica video tramite ffmpeg
//! - `platform`: Risoluzione dell'eseguibile ffmpeg
//! - `progress`: Report per-file, statistiche e progress bar
//! - `json_output`: Eventi JSON per consumatori automatici
//! - `compressor`: Orchestratore del run
//!
//! ## Utilizzo:
//! ```no_run
//! # async fn demo() -> Result<(), media_tree_compressor::CompressError> {
//! let summary = media_tree_compressor::run("images", "compressed").await?;
//! println!("{} files failed", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod platform;
pub mod progress;
pub mod video_processor;

pub use compressor::{run, TreeCompressor};
pub use config::{Config, ImageSettings, VideoSettings};
pub use error::CompressError;
pub use file_manager::{FileTask, MediaClass};
pub use progress::{OutputFormat, Reporter, RunSummary};
pub use video_processor::{FfmpegTranscoder, VideoTranscoder};
