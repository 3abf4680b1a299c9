//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per consumo
//! programmatico (un oggetto per riga su stdout).
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio della run (root risolte, totale file, configurazione)
//! - `file_complete`: Esito di un singolo file
//! - `complete`: Fine della run con i conteggi aggregati

use crate::config::Config;
use crate::task::{RunSummary, TaskOutcome, TaskStatus};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio della run
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    /// Esito di un singolo file
    #[serde(rename = "file_complete")]
    FileComplete {
        destination: PathBuf,
        ok: bool,
        error: Option<String>,
    },

    /// Run completata
    #[serde(rename = "complete")]
    Complete {
        total: usize,
        succeeded: usize,
        failed: usize,
        duration_seconds: f64,
    },
}

/// Configurazione riportata nel messaggio di start
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub percent: u32,
    pub quality: u8,
    pub optimize: bool,
    pub strip_metadata: bool,
    pub convert_to_webp: bool,
    pub webp_lossless: bool,
    pub workers: usize,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Crea un messaggio di inizio
    pub fn start(input_dir: &Path, output_dir: &Path, total_files: usize, config: &Config) -> Self {
        Self::Start {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            total_files,
            config: JsonConfig::from(config),
        }
    }

    /// Crea un messaggio di completamento file
    pub fn file_complete(outcome: &TaskOutcome) -> Self {
        let (ok, error) = match &outcome.status {
            TaskStatus::Ok => (true, None),
            TaskStatus::Failed(message) => (false, Some(message.clone())),
        };
        Self::FileComplete {
            destination: outcome.destination.clone(),
            ok,
            error,
        }
    }

    /// Crea un messaggio di completamento generale
    pub fn complete(summary: &RunSummary, duration_seconds: f64) -> Self {
        Self::Complete {
            total: summary.total,
            succeeded: summary.succeeded,
            failed: summary.failed(),
            duration_seconds,
        }
    }
}

/// Converti la Config della run in JsonConfig
impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            percent: config.percent,
            quality: config.quality,
            optimize: config.optimize,
            strip_metadata: config.strip_metadata,
            convert_to_webp: config.convert_to_webp,
            webp_lossless: config.webp_lossless,
            workers: config.worker_count(),
        }
    }
}
