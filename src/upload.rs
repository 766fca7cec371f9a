//! File attachment metadata
//!
//! Uploads are recorded for display only: name, size, and a coarse kind
//! guessed from the file name. File contents are never read.

use crate::error::{CopydeskError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Coarse classification of an attached file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Document,
    Spreadsheet,
    Image,
    Text,
    Other,
}

impl FileKind {
    /// Guess the kind from substrings of the file name
    ///
    /// # Examples
    ///
    /// ```
    /// use copydesk::upload::FileKind;
    ///
    /// assert_eq!(FileKind::classify("Q3-Report.PDF"), FileKind::Pdf);
    /// assert_eq!(FileKind::classify("brief.docx"), FileKind::Document);
    /// assert_eq!(FileKind::classify("archive.tar.gz"), FileKind::Other);
    /// ```
    pub fn classify(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains(".pdf") {
            Self::Pdf
        } else if name.contains(".doc") || name.contains(".rtf") || name.contains(".odt") {
            Self::Document
        } else if name.contains(".xls") || name.contains(".csv") || name.contains(".ods") {
            Self::Spreadsheet
        } else if [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"]
            .iter()
            .any(|ext| name.contains(ext))
        {
            Self::Image
        } else if name.contains(".txt") || name.contains(".md") {
            Self::Text
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pdf => "pdf",
            Self::Document => "document",
            Self::Spreadsheet => "spreadsheet",
            Self::Image => "image",
            Self::Text => "text",
            Self::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// Metadata of an attached file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub kind: FileKind,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let kind = FileKind::classify(&name);
        Self { name, size, kind }
    }

    /// Record metadata for the file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::Validation`] when the path is not a regular
    /// file, and an IO error when its metadata cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(CopydeskError::Io)?;
        if !metadata.is_file() {
            return Err(CopydeskError::Validation(format!(
                "Not a regular file: {}",
                path.display()
            ))
            .into());
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                CopydeskError::Validation(format!("Path has no file name: {}", path.display()))
            })?;
        Ok(Self::new(name, metadata.len()))
    }

    /// Human-readable size, e.g. `1.5 KB`
    pub fn display_size(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} {}", self.size, UNITS[0])
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}
