//! Configuration management for Copydesk
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::catalog::{ContentType, GenerationSettings, ResearchType, Tone};
use crate::error::{CopydeskError, Result};
use crate::export::{default_library_dir, Library};
use crate::generation::TemplateGenerator;
use crate::session::{ContentWorkspace, DeletePolicy, ResearchWorkspace};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the simulated generation delay (milliseconds)
const MAX_DELAY_CEILING_MS: u64 = 120_000;

/// Main configuration structure for Copydesk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Debounced auto-save of content drafts
    #[serde(default)]
    pub autosave: AutosaveConfig,
    /// Session store policy
    #[serde(default)]
    pub sessions: SessionsConfig,
    /// Generation service settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Defaults for new content drafts
    #[serde(default)]
    pub content: ContentConfig,
    /// Defaults for new research threads
    #[serde(default)]
    pub research: ResearchConfig,
    /// "Save to library" export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Auto-save configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Quiet period before a draft is committed (milliseconds)
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
}

fn default_quiet_period_ms() -> u64 {
    2000
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period_ms(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Allow deleting the only remaining session
    #[serde(default)]
    pub allow_delete_last: bool,
}

/// Generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Lower bound of the simulated latency (milliseconds)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the simulated latency (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Model label reported with research replies
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_model() -> String {
    crate::generation::template::DEFAULT_MODEL.to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            model: default_model(),
        }
    }
}

/// Content draft defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Content type of the first draft
    #[serde(default)]
    pub default_type: ContentType,

    #[serde(default)]
    pub tone: Tone,

    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "English".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            default_type: ContentType::default(),
            tone: Tone::default(),
            language: default_language(),
        }
    }
}

/// Research thread defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Research type of the first thread
    #[serde(default)]
    pub default_type: ResearchType,
}

/// Export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving saved text files; the user data dir when unset
    #[serde(default)]
    pub library_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CopydeskError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CopydeskError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(quiet) = std::env::var("COPYDESK_QUIET_PERIOD_MS") {
            match quiet.parse::<u64>() {
                Ok(v) => {
                    self.autosave.quiet_period_ms = v;
                    tracing::debug!(quiet_period_ms = v, "Env override: COPYDESK_QUIET_PERIOD_MS");
                }
                Err(_) => tracing::warn!("Invalid COPYDESK_QUIET_PERIOD_MS: {}", quiet),
            }
        }

        if let Ok(allow) = std::env::var("COPYDESK_ALLOW_DELETE_LAST") {
            match allow.parse::<bool>() {
                Ok(v) => {
                    self.sessions.allow_delete_last = v;
                    tracing::debug!(allow_delete_last = v, "Env override: COPYDESK_ALLOW_DELETE_LAST");
                }
                Err(_) => tracing::warn!("Invalid COPYDESK_ALLOW_DELETE_LAST: {}", allow),
            }
        }

        if let Ok(min_delay) = std::env::var("COPYDESK_MIN_DELAY_MS") {
            if let Ok(value) = min_delay.parse() {
                self.generation.min_delay_ms = value;
            } else {
                tracing::warn!("Invalid COPYDESK_MIN_DELAY_MS: {}", min_delay);
            }
        }

        if let Ok(max_delay) = std::env::var("COPYDESK_MAX_DELAY_MS") {
            if let Ok(value) = max_delay.parse() {
                self.generation.max_delay_ms = value;
            } else {
                tracing::warn!("Invalid COPYDESK_MAX_DELAY_MS: {}", max_delay);
            }
        }

        if let Ok(model) = std::env::var("COPYDESK_MODEL") {
            self.generation.model = model;
        }

        if let Ok(content_type) = std::env::var("COPYDESK_CONTENT_TYPE") {
            self.content.default_type = ContentType::from_slug(&content_type);
        }

        if let Ok(tone) = std::env::var("COPYDESK_TONE") {
            match Tone::parse_str(&tone) {
                Some(t) => self.content.tone = t,
                None => tracing::warn!("Invalid tone: {}, keeping {}", tone, self.content.tone),
            }
        }

        if let Ok(dir) = std::env::var("COPYDESK_LIBRARY_DIR") {
            self.export.library_dir = Some(PathBuf::from(dir));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(dir) = &cli.library_dir {
            self.export.library_dir = Some(dir.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.autosave.quiet_period_ms == 0 {
            return Err(CopydeskError::Config(
                "autosave.quiet_period_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.generation.min_delay_ms > self.generation.max_delay_ms {
            return Err(CopydeskError::Config(format!(
                "generation.min_delay_ms ({}) must not exceed generation.max_delay_ms ({})",
                self.generation.min_delay_ms, self.generation.max_delay_ms
            ))
            .into());
        }

        if self.generation.max_delay_ms > MAX_DELAY_CEILING_MS {
            return Err(CopydeskError::Config(format!(
                "generation.max_delay_ms must be at most {}",
                MAX_DELAY_CEILING_MS
            ))
            .into());
        }

        if self.generation.model.trim().is_empty() {
            return Err(
                CopydeskError::Config("generation.model cannot be empty".to_string()).into(),
            );
        }

        if self.content.language.trim().is_empty() {
            return Err(
                CopydeskError::Config("content.language cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.autosave.quiet_period_ms)
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        DeletePolicy::from_allow_delete_last(self.sessions.allow_delete_last)
    }

    /// Settings applied to every fresh content draft
    pub fn base_settings(&self) -> GenerationSettings {
        let mut settings = GenerationSettings::defaults_for(&self.content.default_type);
        settings.tone = self.content.tone;
        settings.language = self.content.language.clone();
        settings
    }

    /// Empty content workspace configured from this config
    pub fn content_workspace(&self) -> ContentWorkspace {
        ContentWorkspace::new(self.quiet_period(), self.delete_policy())
            .with_default_type(self.content.default_type.clone())
            .with_base_settings(self.base_settings())
    }

    /// Empty research workspace configured from this config
    pub fn research_workspace(&self) -> ResearchWorkspace {
        ResearchWorkspace::new(self.delete_policy())
            .with_default_type(self.research.default_type.clone())
    }

    pub fn generator(&self) -> TemplateGenerator {
        TemplateGenerator::new(
            self.generation.model.clone(),
            Duration::from_millis(self.generation.min_delay_ms),
            Duration::from_millis(self.generation.max_delay_ms),
        )
    }

    /// Export library, falling back to `./library` when no data dir exists
    pub fn library(&self) -> Library {
        let dir = self
            .export
            .library_dir
            .clone()
            .or_else(default_library_dir)
            .unwrap_or_else(|| PathBuf::from("library"));
        Library::new(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.autosave.quiet_period_ms, 2000);
        assert!(!config.sessions.allow_delete_last);
        assert_eq!(config.generation.model, "copydesk-template");
        assert_eq!(config.content.default_type, ContentType::BlogPost);
        assert_eq!(config.research.default_type, ResearchType::MarketAnalysis);
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_quiet_period() {
        let mut config = Config::default();
        config.autosave.quiet_period_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_reversed_delays() {
        let mut config = Config::default();
        config.generation.min_delay_ms = 3000;
        config.generation.max_delay_ms = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_delay_too_large() {
        let mut config = Config::default();
        config.generation.max_delay_ms = MAX_DELAY_CEILING_MS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_model_and_language() {
        let mut config = Config::default();
        config.generation.model = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.content.language = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
autosave:
  quiet_period_ms: 500
sessions:
  allow_delete_last: true
generation:
  min_delay_ms: 0
  max_delay_ms: 10
  model: house-style
content:
  default_type: social-caption
  tone: casual
  language: Spanish
research:
  default_type: keyword-research
export:
  library_dir: /tmp/copydesk-library
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.quiet_period(), Duration::from_millis(500));
        assert_eq!(config.delete_policy(), DeletePolicy::AllowEmpty);
        assert_eq!(config.generation.model, "house-style");
        assert_eq!(config.content.default_type, ContentType::SocialCaption);
        assert_eq!(config.content.tone, Tone::Casual);
        assert_eq!(config.research.default_type, ResearchType::KeywordResearch);
        assert_eq!(
            config.library().dir(),
            Path::new("/tmp/copydesk-library")
        );
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("generation:\n  model: m\n").unwrap();
        assert_eq!(config.generation.min_delay_ms, 1000);
        assert_eq!(config.autosave.quiet_period_ms, 2000);
        assert_eq!(config.content.language, "English");
    }

    #[test]
    fn test_content_workspace_uses_configured_defaults() {
        let mut config = Config::default();
        config.content.default_type = ContentType::AdCopy;
        config.content.tone = Tone::Humorous;
        let ws = config.content_workspace();
        assert_eq!(ws.draft().content_type, ContentType::AdCopy);
        assert_eq!(ws.draft().settings.word_count, 100);
        assert_eq!(ws.draft().settings.tone, Tone::Humorous);
        assert_eq!(ws.quiet_period(), Duration::from_millis(2000));
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.autosave.quiet_period_ms, 2000);
    }

    #[test]
    fn test_load_invalid_yaml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "autosave: [not, a, map]").unwrap();

        let err = Config::load(path.to_str().unwrap(), &crate::cli::Cli::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CopydeskError>(),
            Some(CopydeskError::Config(_))
        ));
    }

    #[test]
    fn test_cli_library_dir_overrides_file() {
        let cli = crate::cli::Cli {
            library_dir: Some(PathBuf::from("/srv/library")),
            ..Default::default()
        };
        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.library().dir(), Path::new("/srv/library"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("COPYDESK_QUIET_PERIOD_MS", "750");
        env::set_var("COPYDESK_ALLOW_DELETE_LAST", "true");
        env::set_var("COPYDESK_TONE", "friendly");

        let mut config = Config::default();
        config.apply_env_vars();
        assert_eq!(config.autosave.quiet_period_ms, 750);
        assert!(config.sessions.allow_delete_last);
        assert_eq!(config.content.tone, Tone::Friendly);

        env::remove_var("COPYDESK_QUIET_PERIOD_MS");
        env::remove_var("COPYDESK_ALLOW_DELETE_LAST");
        env::remove_var("COPYDESK_TONE");
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_are_ignored() {
        env::set_var("COPYDESK_QUIET_PERIOD_MS", "soon");
        env::set_var("COPYDESK_TONE", "angry");

        let mut config = Config::default();
        config.apply_env_vars();
        assert_eq!(config.autosave.quiet_period_ms, 2000);
        assert_eq!(config.content.tone, Tone::Professional);

        env::remove_var("COPYDESK_QUIET_PERIOD_MS");
        env::remove_var("COPYDESK_TONE");
    }

    #[test]
    fn test_example_config_parses() {
        let contents = std::fs::read_to_string("config/config.yaml")
            .expect("Failed to read example config/config.yaml");
        let config: Config = serde_yaml::from_str(&contents).expect("Failed to parse config");
        assert!(config.validate().is_ok());
    }
}
