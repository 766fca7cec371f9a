//! Test utilities for Copydesk
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, scripted generators and assertion helpers.

use crate::catalog::ResearchType;
use crate::config::Config;
use crate::error::{CopydeskError, Result};
use crate::generation::{GenerationRequest, Generator, ResearchReply};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration with zero generation latency and a library in `dir`
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.generation.min_delay_ms = 0;
    config.generation.max_delay_ms = 0;
    config.export.library_dir = Some(dir.path().join("library"));
    config
}

/// Generator returning fixed text and counting its calls
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    pub reply: String,
    pub fail: bool,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(CopydeskError::Generation("scripted failure".to_string()).into())
        } else {
            Ok(self.reply.clone())
        }
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        self.next()
    }

    async fn research(&self, _research_type: &ResearchType, _question: &str) -> Result<ResearchReply> {
        Ok(ResearchReply::new(self.next()?, "scripted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(CopydeskError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_is_valid() {
        let dir = temp_dir();
        let config = test_config(&dir);
        assert!(config.validate().is_ok());
        assert_eq!(config.library().dir(), dir.path().join("library"));
    }

    #[tokio::test]
    async fn test_scripted_generator_counts_calls() {
        let generator = ScriptedGenerator::failing();
        assert!(generator.research(&ResearchType::General, "q").await.is_err());
        assert_eq!(generator.calls(), 1);
    }
}
