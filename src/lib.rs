//! # Image Scaler Library
//!
//! Modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `task`: Modello dati del batch (task, esiti, riepilogo)
//! - `file_manager`: Discovery delle immagini
//! - `metadata`: Payload EXIF/ICC e orientamento
//! - `image_processor`: Trasformazione di una singola immagine
//! - `optimizer`: Orchestratore, batch coordinator e path mapping
//! - `progress`: Progress bar
//! - `json_output`: Eventi JSON per consumo programmatico
//!
//! ## Utilizzo:
//! ```no_run
//! use image_scaler::{Config, ScaleRunner};
//!
//! # async fn run() -> Result<(), image_scaler::ScaleError> {
//! let config = Config {
//!     percent: 50,
//!     ..Default::default()
//! };
//! let runner = ScaleRunner::new(config)?;
//! let summary = runner.run().await?;
//! println!("{}", summary.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod metadata;
pub mod optimizer;
pub mod progress;
pub mod task;

pub use config::Config;
pub use error::ScaleError;
pub use optimizer::ScaleRunner;
pub use task::{ImageTask, RunSummary, TaskOutcome, TaskStatus};
