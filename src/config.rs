//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri della run
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `percent`: Percentuale di scala (> 0, 100 = dimensioni originali)
//! - `input_dir` / `output_dir`: Root del tree sorgente e speculare
//! - `quality`: Qualità JPEG/WebP (1-100, default: 85)
//! - `optimize`: Ottimizzazione lossless dove supportata (JPEG/PNG)
//! - `strip_metadata`: Rimuove EXIF/ICC dagli output
//! - `convert_to_webp`: Converte tutti gli output in WebP
//! - `webp_lossless`: WebP lossless (ignora quality)
//! - `workers`: Worker paralleli (default: core logici)
//! - `json_output`: Eventi JSON su stdout al posto della progress bar
//!
//! ## Validazione:
//! - Controlla che percent sia > 0
//! - Controlla che quality sia 1-100
//! - Controlla che workers, se specificato, sia > 0

use crate::error::ScaleError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a batch scaling run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scale percent (100 = original size)
    pub percent: u32,
    /// Input images directory
    pub input_dir: PathBuf,
    /// Output directory (mirrors the input tree)
    pub output_dir: PathBuf,
    /// Quality for JPEG/WebP (1-100)
    pub quality: u8,
    /// Enable lossless optimizer where supported (JPEG/PNG)
    pub optimize: bool,
    /// Strip metadata (EXIF/ICC) from outputs
    pub strip_metadata: bool,
    /// Convert all outputs to WebP format
    pub convert_to_webp: bool,
    /// Save WebP losslessly (ignores quality)
    pub webp_lossless: bool,
    /// Number of parallel workers (None = logical core count)
    pub workers: Option<usize>,
    /// Output progress and results as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            percent: 100,
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("images-scaled"),
            quality: 85,
            optimize: false,
            strip_metadata: false,
            convert_to_webp: false,
            webp_lossless: false,
            workers: None,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ScaleError> {
        if self.percent == 0 {
            return Err(ScaleError::Config(
                "percent must be greater than 0".to_string(),
            ));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(ScaleError::Config(
                "quality must be between 1 and 100".to_string(),
            ));
        }

        if self.workers == Some(0) {
            return Err(ScaleError::Config(
                "number of workers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Worker count: configured value, else logical core count with a
    /// floor of 4 when the platform cannot report it
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.percent = 0;
        assert!(config.validate().is_err());

        config.percent = 50;
        config.quality = 0;
        assert!(config.validate().is_err());

        config.quality = 101;
        assert!(config.validate().is_err());

        config.quality = 85;
        config.workers = Some(0);
        assert!(config.validate().is_err());

        config.workers = Some(8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.percent, 100);
        assert_eq!(config.input_dir, PathBuf::from("images"));
        assert_eq!(config.output_dir, PathBuf::from("images-scaled"));
        assert_eq!(config.quality, 85);
        assert!(!config.optimize);
        assert!(!config.strip_metadata);
        assert!(!config.convert_to_webp);
        assert!(!config.webp_lossless);
        assert_eq!(config.workers, None);
    }

    #[test]
    fn test_worker_count_respects_override() {
        let config = Config {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(config.worker_count(), 3);

        let config = Config::default();
        assert!(config.worker_count() >= 1);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            percent: 50,
            quality: 70,
            optimize: true,
            convert_to_webp: true,
            workers: Some(8),
            ..Default::default()
        };

        // Save config
        original_config.save_to_file(&config_path).await.unwrap();

        // Load config
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.percent, 50);
        assert_eq!(loaded_config.quality, 70);
        assert!(loaded_config.optimize);
        assert!(loaded_config.convert_to_webp);
        assert_eq!(loaded_config.workers, Some(8));
    }

    #[tokio::test]
    async fn test_config_missing_file_falls_back_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing.json");

        let loaded = Config::from_file(&config_path).await.unwrap();
        assert_eq!(loaded.percent, Config::default().percent);
    }
}
