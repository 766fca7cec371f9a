//! Best-effort clipboard copy
//!
//! Tries a cascade of transports in order:
//! 1. System clipboard via `arboard`
//! 2. OSC 52 terminal escape sequence (only when stdout is a terminal)
//! 3. Manual copy: the text is framed on stderr for the user to select
//!
//! Copying never fails outward. The outcome carries a success flag and the
//! notice to show; only the exhausted final fallback reports failure.

use crate::notice::Notice;
use std::io::{IsTerminal, Write};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure of a single clipboard transport
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("System clipboard failed: {0}")]
    System(String),
    #[error("OSC 52 clipboard failed: {0}")]
    Osc52(String),
    #[error("Manual copy required")]
    Manual,
}

/// One way of putting text on the clipboard
pub trait ClipboardBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Platform clipboard through `arboard`
pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))
    }
}

/// Terminal clipboard via the OSC 52 escape sequence
pub struct Osc52Clipboard;

impl ClipboardBackend for Osc52Clipboard {
    fn name(&self) -> &'static str {
        "osc52"
    }

    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        use base64::Engine;

        let mut stdout = std::io::stdout();
        if !stdout.is_terminal() {
            return Err(ClipboardError::Osc52("stdout is not a terminal".to_string()));
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        write!(stdout, "\x1b]52;c;{}\x1b\\", encoded)
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| ClipboardError::Osc52(e.to_string()))
    }
}

/// Shows the text for manual selection; always reports that nothing was copied
pub struct ManualCopy;

impl ClipboardBackend for ManualCopy {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stderr = std::io::stderr();
        let rule = "─".repeat(40);
        let _ = writeln!(stderr, "{}\n{}\n{}", rule, text, rule);
        Err(ClipboardError::Manual)
    }
}

/// Result of a copy attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub copied: bool,
    /// Transport that succeeded, if any
    pub via: Option<&'static str>,
    pub notice: Notice,
}

/// Ordered set of clipboard transports
pub struct Clipboard {
    backends: Vec<Box<dyn ClipboardBackend>>,
}

impl Clipboard {
    /// System clipboard, then OSC 52, then manual copy
    pub fn platform() -> Self {
        Self::with_backends(vec![
            Box::new(SystemClipboard),
            Box::new(Osc52Clipboard),
            Box::new(ManualCopy),
        ])
    }

    pub fn with_backends(backends: Vec<Box<dyn ClipboardBackend>>) -> Self {
        Self { backends }
    }

    /// Copy `text`, falling through the transports until one succeeds
    pub fn copy(&self, text: &str) -> CopyOutcome {
        if text.trim().is_empty() {
            return CopyOutcome {
                copied: false,
                via: None,
                notice: Notice::error("There is no content to copy"),
            };
        }

        for backend in &self.backends {
            match backend.copy(text) {
                Ok(()) => {
                    debug!(backend = backend.name(), "Copied text to clipboard");
                    return CopyOutcome {
                        copied: true,
                        via: Some(backend.name()),
                        notice: Notice::success("Copied to clipboard"),
                    };
                }
                Err(e) => debug!(backend = backend.name(), error = %e, "Clipboard transport failed"),
            }
        }

        warn!("All clipboard transports failed");
        CopyOutcome {
            copied: false,
            via: None,
            notice: Notice::error("Copy failed. Please select the text and copy it manually."),
        }
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::platform()
    }
}
