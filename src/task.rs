//! # Task Data Model
//!
//! Strutture dati del batch: il task immutabile per ogni file scoperto,
//! l'esito per-file e il riepilogo aggregato della run.
//!
//! Ogni file scoperto produce esattamente un `TaskOutcome`; il riepilogo è
//! un fold commutativo, quindi l'ordine di completamento dei worker è
//! irrilevante per il risultato.

use crate::config::Config;
use std::path::PathBuf;
use std::sync::Arc;

/// Unità di lavoro immutabile: un file sorgente più la configurazione
/// condivisa della run (root di input/output, percentuale, policy di
/// salvataggio)
#[derive(Debug, Clone)]
pub struct ImageTask {
    pub source: PathBuf,
    pub config: Arc<Config>,
}

impl ImageTask {
    pub fn new(source: PathBuf, config: Arc<Config>) -> Self {
        Self { source, config }
    }
}

/// Stato finale dell'elaborazione di un singolo file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Ok,
    Failed(String),
}

/// Esito dell'elaborazione di un singolo file
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub destination: PathBuf,
    pub status: TaskStatus,
}

impl TaskOutcome {
    pub fn ok(destination: PathBuf) -> Self {
        Self {
            destination,
            status: TaskStatus::Ok,
        }
    }

    pub fn failed(destination: PathBuf, message: impl Into<String>) -> Self {
        Self {
            destination,
            status: TaskStatus::Failed(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, TaskStatus::Ok)
    }
}

/// Riepilogo aggregato di una run completa
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Fallimenti in ordine di completamento
    pub failures: Vec<TaskOutcome>,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failures: Vec::new(),
        }
    }

    /// Registra un esito
    pub fn record(&mut self, outcome: TaskOutcome) {
        if outcome.is_ok() {
            self.succeeded += 1;
        } else {
            self.failures.push(outcome);
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Succeeded: {} | Failed: {}",
            self.total,
            self.succeeded,
            self.failed()
        )
    }
}
