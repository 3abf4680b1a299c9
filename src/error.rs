//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Categorie di errori:
//! - `Config`: Parametri di configurazione non validi (pre-flight)
//! - `InputNotFound`: Directory di input mancante (pre-flight)
//! - `PathMapping`: Sorgente fuori dalla directory di input (difensivo)
//! - `Io` / `Image` / `Encode` / `Metadata`: Errori per-file
//!
//! Gli errori pre-flight interrompono l'intera esecuzione prima di toccare
//! qualsiasi file; gli errori per-file vengono degradati a `TaskOutcome`
//! dentro il transform engine e non attraversano mai il confine dei worker.

use std::path::PathBuf;

/// Custom error types for batch image scaling
#[derive(thiserror::Error, Debug)]
pub enum ScaleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Input directory not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Path mapping error: {0}")]
    PathMapping(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Encoding error: {0}")]
    Encode(String),
}
