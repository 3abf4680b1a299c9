//! # File Discovery Module
//!
//! Questo modulo gestisce la discovery ricorsiva delle immagini da elaborare.
//!
//! ## Formati supportati:
//! JPG, JPEG, PNG, WebP, BMP, TIF, TIFF (estensioni case-insensitive)
//!
//! File non regolari, directory ed entry non leggibili vengono saltati
//! silenziosamente; una directory senza immagini produce una lista vuota,
//! non un errore.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Manages discovery of image files
pub struct FileManager;

impl FileManager {
    /// Find all supported image files in a directory (recursive)
    pub fn find_image_files(input_dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(input_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| Self::is_supported_format(path))
            .collect()
    }

    /// Check if a file has a supported image extension
    pub fn is_supported_format(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(
                ext_lower.as_str(),
                "jpg" | "jpeg" | "png" | "webp" | "bmp" | "tif" | "tiff"
            )
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_is_supported_format() {
        assert!(FileManager::is_supported_format(Path::new("a.jpg")));
        assert!(FileManager::is_supported_format(Path::new("a.JPEG")));
        assert!(FileManager::is_supported_format(Path::new("a.Png")));
        assert!(FileManager::is_supported_format(Path::new("a.tiff")));
        assert!(!FileManager::is_supported_format(Path::new("a.txt")));
        assert!(!FileManager::is_supported_format(Path::new("a.mp4")));
        assert!(!FileManager::is_supported_format(Path::new("noext")));
    }

    #[test]
    fn test_find_image_files_recursive_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        touch(&root.join("a.jpg"));
        touch(&root.join("nested/deep/b.PNG"));
        touch(&root.join("nested/c.webp"));
        touch(&root.join("notes.txt"));
        touch(&root.join("nested/video.mp4"));

        let mut found = FileManager::find_image_files(root);
        found.sort();

        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| FileManager::is_supported_format(p)));
    }

    #[test]
    fn test_find_image_files_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let found = FileManager::find_image_files(temp_dir.path());
        assert!(found.is_empty());
    }
}
