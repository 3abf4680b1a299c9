//! # Batch Coordinator
//!
//! Fan-out dei task su un pool di worker a dimensione fissa. Ogni transform
//! è un'unità di lavoro sincrona eseguita su `spawn_blocking`;
//! `buffer_unordered` limita la concorrenza al numero di worker e produce
//! gli esiti in ordine di completamento. Il fallimento di un task non
//! cancella mai gli altri.

use crate::image_processor::ImageProcessor;
use crate::json_output::JsonMessage;
use crate::progress::ProgressManager;
use crate::task::{ImageTask, RunSummary, TaskOutcome, TaskStatus};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Esegue tutti i task su `workers` worker paralleli e aggrega gli esiti
pub async fn run_batch(
    tasks: Vec<ImageTask>,
    workers: usize,
    progress: Option<&ProgressManager>,
    json_output: bool,
) -> RunSummary {
    let total = tasks.len();
    let mut summary = RunSummary::new(total);

    let mut outcomes = stream::iter(tasks.into_iter().map(|task| {
        let source = task.source.clone();
        async move {
            match tokio::task::spawn_blocking(move || ImageProcessor::transform(&task)).await {
                Ok(outcome) => outcome,
                // Un panic nel worker diventa un esito negativo per quel
                // solo task
                Err(e) => TaskOutcome::failed(source, format!("worker terminated: {e}")),
            }
        }
    }))
    .buffer_unordered(workers.max(1));

    while let Some(outcome) = outcomes.next().await {
        match &outcome.status {
            TaskStatus::Ok => {
                debug!("[OK] {}", outcome.destination.display());
                if let Some(bar) = progress {
                    bar.update(&format!("[OK] {}", display_name(&outcome)));
                }
            }
            TaskStatus::Failed(message) => {
                warn!("[ERROR] {}: {}", outcome.destination.display(), message);
                if let Some(bar) = progress {
                    bar.update(&format!("[ERROR] {}", display_name(&outcome)));
                }
            }
        }
        if json_output {
            JsonMessage::file_complete(&outcome).emit();
        }
        summary.record(outcome);
    }

    summary
}

fn display_name(outcome: &TaskOutcome) -> String {
    outcome
        .destination
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use image::{DynamicImage, RgbImage};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_test_png(path: &Path, width: u32, height: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .save(path)
            .unwrap();
    }

    fn make_tasks(config: Config, sources: Vec<std::path::PathBuf>) -> Vec<ImageTask> {
        let config = Arc::new(config);
        sources
            .into_iter()
            .map(|source| ImageTask::new(source, Arc::clone(&config)))
            .collect()
    }

    #[tokio::test]
    async fn test_run_batch_empty() {
        let summary = run_batch(Vec::new(), 4, None, false).await;
        assert_eq!(summary.total, 0);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed(), 0);
    }

    #[tokio::test]
    async fn test_run_batch_isolates_failures() {
        let temp_dir = TempDir::new().unwrap();
        let input_dir = temp_dir.path().join("in");
        let output_dir = temp_dir.path().join("out");

        let good: Vec<_> = (0..3)
            .map(|i| {
                let path = input_dir.join(format!("ok-{i}.png"));
                write_test_png(&path, 16, 16);
                path
            })
            .collect();
        let corrupt = input_dir.join("bad.png");
        std::fs::write(&corrupt, b"garbage").unwrap();

        let config = Config {
            percent: 50,
            input_dir: input_dir.clone(),
            output_dir: output_dir.clone(),
            ..Default::default()
        };
        let mut sources = good.clone();
        sources.push(corrupt);

        let summary = run_batch(make_tasks(config, sources), 2, None, false).await;

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded + summary.failed(), summary.total);
        assert_eq!(summary.failures[0].destination, output_dir.join("bad.png"));

        // i file validi sono stati comunque scritti
        for source in good {
            let destination = output_dir.join(source.file_name().unwrap());
            assert!(destination.exists(), "{} missing", destination.display());
        }
    }

    #[tokio::test]
    async fn test_run_batch_single_worker_processes_all() {
        let temp_dir = TempDir::new().unwrap();
        let input_dir = temp_dir.path().join("in");
        let output_dir = temp_dir.path().join("out");

        let sources: Vec<_> = (0..5)
            .map(|i| {
                let path = input_dir.join(format!("img-{i}.png"));
                write_test_png(&path, 8, 8);
                path
            })
            .collect();

        let config = Config {
            percent: 100,
            input_dir,
            output_dir,
            ..Default::default()
        };

        let summary = run_batch(make_tasks(config, sources), 1, None, false).await;
        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 5);
    }
}
