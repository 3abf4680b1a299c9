//! # Run Orchestrator
//!
//! Orchestratore principale: valida gli input, esegue la discovery, pilota
//! il batch coordinator e produce il report finale.

use crate::{
    config::Config,
    error::ScaleError,
    file_manager::FileManager,
    json_output::JsonMessage,
    optimizer::batch,
    progress::ProgressManager,
    task::{ImageTask, RunSummary, TaskStatus},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Numero massimo di fallimenti elencati nel report finale
const MAX_REPORTED_FAILURES: usize = 20;

/// Orchestratore di una run completa
pub struct ScaleRunner {
    config: Config,
}

impl ScaleRunner {
    /// Crea il runner validando la configurazione; nessun effetto sul
    /// filesystem prima che la validazione passi
    pub fn new(config: Config) -> Result<Self, ScaleError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Esegue l'intera run e restituisce il riepilogo aggregato
    pub async fn run(&self) -> Result<RunSummary, ScaleError> {
        let start_time = Instant::now();

        let input_dir = &self.config.input_dir;
        if !input_dir.exists() || !input_dir.is_dir() {
            return Err(ScaleError::InputNotFound(input_dir.clone()));
        }
        let input_dir = input_dir.canonicalize()?;

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let output_dir = self.config.output_dir.canonicalize()?;

        info!("Scanning for images in: {}", input_dir.display());
        let files = FileManager::find_image_files(&input_dir);
        if files.is_empty() {
            info!("No supported images found.");
            return Ok(RunSummary::new(0));
        }

        let workers = self.config.worker_count();
        info!(
            "Found {} images. Processing with {} workers...",
            files.len(),
            workers
        );

        // Configurazione condivisa con le root risolte
        let config = Arc::new(Config {
            input_dir: input_dir.clone(),
            output_dir: output_dir.clone(),
            ..self.config.clone()
        });

        if config.json_output {
            JsonMessage::start(&input_dir, &output_dir, files.len(), &config).emit();
        }

        let progress = if config.json_output {
            None
        } else {
            Some(ProgressManager::new(files.len() as u64))
        };

        let tasks: Vec<ImageTask> = files
            .into_iter()
            .map(|source| ImageTask::new(source, Arc::clone(&config)))
            .collect();

        let summary = batch::run_batch(tasks, workers, progress.as_ref(), config.json_output).await;

        if let Some(bar) = &progress {
            bar.finish(&summary.format_summary());
        }

        self.report(&summary, start_time.elapsed().as_secs_f64());
        Ok(summary)
    }

    /// Report finale: conteggi più l'elenco dei fallimenti (troncato)
    fn report(&self, summary: &RunSummary, duration_seconds: f64) {
        if self.config.json_output {
            JsonMessage::complete(summary, duration_seconds).emit();
            return;
        }

        info!(
            "Done. Succeeded: {}, Failed: {}",
            summary.succeeded,
            summary.failed()
        );

        if !summary.failures.is_empty() {
            warn!("Failures:");
            for outcome in summary.failures.iter().take(MAX_REPORTED_FAILURES) {
                if let TaskStatus::Failed(message) = &outcome.status {
                    warn!("- {}: {}", outcome.destination.display(), message);
                }
            }
            if summary.failures.len() > MAX_REPORTED_FAILURES {
                warn!(
                    "... and {} more",
                    summary.failures.len() - MAX_REPORTED_FAILURES
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::path::Path;
    use tempfile::TempDir;

    fn write_test_png(path: &Path, width: u32, height: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .save(path)
            .unwrap();
    }

    fn base_config(temp_dir: &TempDir, percent: u32) -> Config {
        Config {
            percent,
            input_dir: temp_dir.path().join("in"),
            output_dir: temp_dir.path().join("out"),
            workers: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_zero_percent_before_any_side_effect() {
        let temp_dir = TempDir::new().unwrap();
        let config = base_config(&temp_dir, 0);
        let output_dir = config.output_dir.clone();

        assert!(matches!(
            ScaleRunner::new(config),
            Err(ScaleError::Config(_))
        ));
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn test_run_missing_input_directory() {
        let temp_dir = TempDir::new().unwrap();
        let runner = ScaleRunner::new(base_config(&temp_dir, 50)).unwrap();

        let result = runner.run().await;
        assert!(matches!(result, Err(ScaleError::InputNotFound(_))));
    }

    #[tokio::test]
    async fn test_run_input_is_a_file_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = base_config(&temp_dir, 50);
        config.input_dir = temp_dir.path().join("plain.txt");
        std::fs::write(&config.input_dir, b"x").unwrap();

        let runner = ScaleRunner::new(config).unwrap();
        let result = runner.run().await;
        assert!(matches!(result, Err(ScaleError::InputNotFound(_))));
    }

    #[tokio::test]
    async fn test_run_empty_directory_is_success() {
        let temp_dir = TempDir::new().unwrap();
        let config = base_config(&temp_dir, 50);
        std::fs::create_dir_all(&config.input_dir).unwrap();

        let runner = ScaleRunner::new(config).unwrap();
        let summary = runner.run().await.unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(summary.failed(), 0);
    }

    #[tokio::test]
    async fn test_run_full_pipeline_ignores_unsupported_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = base_config(&temp_dir, 50);
        let input_dir = config.input_dir.clone();
        let output_dir = config.output_dir.clone();

        write_test_png(&input_dir.join("a.png"), 32, 32);
        write_test_png(&input_dir.join("nested/b.png"), 16, 16);
        write_test_png(&input_dir.join("nested/deep/c.png"), 8, 8);
        std::fs::write(input_dir.join("readme.txt"), b"not an image").unwrap();

        let runner = ScaleRunner::new(config).unwrap();
        let summary = runner.run().await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed(), 0);

        assert!(output_dir.join("a.png").exists());
        assert!(output_dir.join("nested/b.png").exists());
        assert!(output_dir.join("nested/deep/c.png").exists());
        assert!(!output_dir.join("readme.txt").exists());

        let written = image::open(output_dir.join("a.png")).unwrap();
        assert_eq!((written.width(), written.height()), (16, 16));
    }

    #[tokio::test]
    async fn test_run_counts_partial_failures() {
        let temp_dir = TempDir::new().unwrap();
        let config = base_config(&temp_dir, 50);
        let input_dir = config.input_dir.clone();

        write_test_png(&input_dir.join("good.png"), 10, 10);
        std::fs::write(input_dir.join("broken.jpg"), b"not a jpeg").unwrap();

        let runner = ScaleRunner::new(config).unwrap();
        let summary = runner.run().await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed(), 1);
    }
}
