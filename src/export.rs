//! "Save to library" export
//!
//! Writes a text body as a plain `.txt` file into the library directory.

use crate::error::{CopydeskError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::info;

const TEXT_SUFFIX: &str = ".txt";

/// Normalize a user-supplied file name
///
/// Trims whitespace and appends `.txt` when absent.
///
/// # Errors
///
/// Returns [`CopydeskError::Validation`] for blank names or names that
/// contain path separators.
///
/// # Examples
///
/// ```
/// use copydesk::export::normalize_filename;
///
/// assert_eq!(normalize_filename(" coffee-post ").unwrap(), "coffee-post.txt");
/// assert_eq!(normalize_filename("notes.txt").unwrap(), "notes.txt");
/// assert!(normalize_filename("   ").is_err());
/// ```
pub fn normalize_filename(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CopydeskError::Validation("Please enter a filename".to_string()).into());
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(CopydeskError::Validation(format!(
            "Filename must not contain path separators: {}",
            name
        ))
        .into());
    }
    if name.to_lowercase().ends_with(TEXT_SUFFIX) {
        Ok(name.to_string())
    } else {
        Ok(format!("{}{}", name, TEXT_SUFFIX))
    }
}

/// Default library location inside the user's data directory
pub fn default_library_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "copydesk", "copydesk").map(|dirs| dirs.data_dir().join("library"))
}

/// Directory that receives exported text files
#[derive(Debug, Clone)]
pub struct Library {
    dir: PathBuf,
}

impl Library {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `text` under `filename`, returning the written path
    ///
    /// Existing files with the same name are overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::Validation`] for a blank body or an invalid
    /// file name, and [`CopydeskError::Export`] when writing fails.
    pub fn save(&self, filename: &str, text: &str) -> Result<PathBuf> {
        if text.trim().is_empty() {
            return Err(CopydeskError::Validation("There is no content to save".to_string()).into());
        }
        let filename = normalize_filename(filename)?;

        std::fs::create_dir_all(&self.dir)
            .context("Failed to create library directory")
            .map_err(|e| CopydeskError::Export(format!("{:#}", e)))?;

        let path = self.dir.join(&filename);
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write {}", path.display()))
            .map_err(|e| CopydeskError::Export(format!("{:#}", e)))?;

        info!(path = %path.display(), bytes = text.len(), "Saved content to library");
        Ok(path)
    }
}
