//! Error types for Copydesk
//!
//! This module defines the error types surfaced by the studio workspaces,
//! the generation handler, and the export helpers, using
//! `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Copydesk operations
///
/// Every variant is recoverable: callers surface it as a user-visible notice
/// and the session stores are left exactly as they were before the call.
#[derive(Error, Debug)]
pub enum CopydeskError {
    /// Input rejected at the boundary (blank prompt, blank filename, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The store must keep at least one session once any exists
    #[error("Cannot delete the last remaining session")]
    LastSession,

    /// A generation request is already outstanding
    #[error("A generation request is already in progress")]
    Busy,

    /// The in-flight generation was cancelled by the caller
    #[error("Generation was cancelled")]
    Cancelled,

    /// The generation service failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Saving text to the library failed
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Copydesk operations
///
/// Uses `anyhow::Error` so call sites can attach context; the concrete
/// [`CopydeskError`] is recovered with `downcast_ref` where it matters.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = CopydeskError::Validation("Please enter a prompt".to_string());
        assert_eq!(error.to_string(), "Validation error: Please enter a prompt");
    }

    #[test]
    fn test_last_session_error_display() {
        let error = CopydeskError::LastSession;
        assert_eq!(
            error.to_string(),
            "Cannot delete the last remaining session"
        );
    }

    #[test]
    fn test_generation_error_display() {
        let error = CopydeskError::Generation("template missing".to_string());
        assert_eq!(error.to_string(), "Generation error: template missing");
    }

    #[test]
    fn test_busy_error_display() {
        assert!(CopydeskError::Busy.to_string().contains("in progress"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: CopydeskError = json_error.into();
        assert!(error.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CopydeskError = io_error.into();
        assert!(matches!(error, CopydeskError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: CopydeskError = yaml_error.into();
        assert!(matches!(error, CopydeskError::Yaml(_)));
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let result: Result<()> = Err(CopydeskError::LastSession.into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CopydeskError>(),
            Some(CopydeskError::LastSession)
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CopydeskError>();
    }
}
