//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di destinazione nel tree speculare.
//! La destinazione è una funzione deterministica di (sorgente, root di
//! input, root di output, conversione WebP).

use crate::error::ScaleError;
use std::path::{Path, PathBuf};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Calcola la destinazione speculare: `output_root / relative(source)`,
    /// con estensione sostituita da `.webp` quando si converte.
    /// Una sorgente fuori dalla root di input è una violazione del contratto
    /// della discovery; il controllo è solo difensivo.
    pub fn map(
        source: &Path,
        input_root: &Path,
        output_root: &Path,
        convert_to_webp: bool,
    ) -> Result<PathBuf, ScaleError> {
        let relative = source.strip_prefix(input_root).map_err(|_| {
            ScaleError::PathMapping(format!(
                "{} is not inside input directory {}",
                source.display(),
                input_root.display()
            ))
        })?;

        let mut destination = output_root.join(relative);
        if convert_to_webp {
            destination.set_extension("webp");
        }
        Ok(destination)
    }

    /// Crea le directory parent se necessario. `create_dir_all` è
    /// idempotente: worker concorrenti possono creare lo stesso ancestor
    /// senza errori.
    pub fn ensure_parent_dirs(path: &Path) -> Result<(), ScaleError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
