//! # Compressor Module
//!
//! Separa l'orchestrazione in due sottomoduli:
//! - `tree_compressor`: Orchestratore del run (discovery → dispatch → report)
//! - `path_resolver`: Calcolo dei path speculari e creazione directory

pub mod path_resolver;
pub mod tree_compressor;

pub use path_resolver::PathResolver;
pub use tree_compressor::{run, TreeCompressor};
