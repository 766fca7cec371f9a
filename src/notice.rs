//! User-visible notices
//!
//! Operations report their outcome as a [`Notice`] which the host displays;
//! nothing in the core prints directly.

use crate::error::CopydeskError;
use colored::Colorize;
use std::fmt;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A short message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Turn an operation error into an error notice
    ///
    /// Known [`CopydeskError`] variants get their own wording; anything else
    /// falls back to the error's display text.
    ///
    /// # Examples
    ///
    /// ```
    /// use copydesk::error::CopydeskError;
    /// use copydesk::notice::{Notice, NoticeLevel};
    ///
    /// let notice = Notice::from_error(&CopydeskError::LastSession.into());
    /// assert_eq!(notice.level, NoticeLevel::Error);
    /// assert!(notice.message.contains("last"));
    /// ```
    pub fn from_error(error: &anyhow::Error) -> Self {
        let message = match error.downcast_ref::<CopydeskError>() {
            Some(CopydeskError::Validation(msg)) => msg.clone(),
            Some(CopydeskError::LastSession) => {
                "You can't delete the last session. Start a new one first.".to_string()
            }
            Some(CopydeskError::Busy) => "Please wait for the current generation to finish.".to_string(),
            Some(CopydeskError::Cancelled) => "Generation cancelled.".to_string(),
            Some(CopydeskError::Generation(_)) => {
                "Failed to generate content. Please try again.".to_string()
            }
            _ => error.to_string(),
        };
        Self::error(message)
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    /// Colored single-line rendering for terminal output
    pub fn render(&self) -> String {
        match self.level {
            NoticeLevel::Success => format!("{} {}", "✓".green(), self.message.green()),
            NoticeLevel::Info => format!("{} {}", "•".cyan(), self.message),
            NoticeLevel::Error => format!("{} {}", "✗".red(), self.message.red()),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_passes_through() {
        let err: anyhow::Error = CopydeskError::Validation("Please enter a filename".into()).into();
        assert_eq!(Notice::from_error(&err).message, "Please enter a filename");
    }

    #[test]
    fn test_generation_failure_is_generic() {
        let err: anyhow::Error = CopydeskError::Generation("boom".into()).into();
        let notice = Notice::from_error(&err);
        assert!(notice.is_error());
        assert!(!notice.message.contains("boom"));
    }

    #[test]
    fn test_foreign_error_uses_display() {
        let err = anyhow::anyhow!("disk full");
        assert_eq!(Notice::from_error(&err).message, "disk full");
    }

    #[test]
    fn test_render_contains_message() {
        colored::control::set_override(false);
        assert_eq!(Notice::success("Saved").render(), "✓ Saved");
        assert_eq!(Notice::error("Nope").render(), "✗ Nope");
    }
}
