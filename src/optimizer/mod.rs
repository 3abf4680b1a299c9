//! # Optimizer Module
//!
//! Modulo che separa le responsabilità della run in sottomoduli:
//! - `scale_runner`: Orchestratore principale
//! - `batch`: Fan-out sui worker e aggregazione esiti
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod batch;
pub mod path_resolver;
pub mod scale_runner;

// Re-export delle struct principali
pub use path_resolver::PathResolver;
pub use scale_runner::ScaleRunner;
