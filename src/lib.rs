//! Copydesk - marketing copy and research studio library
//!
//! This library provides the session workspaces behind the Copydesk studio:
//! content drafts with debounced auto-save, research chat threads, a mocked
//! generation service, and the export and clipboard helpers.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Generic session store and the content/research workspaces
//! - `autosave`: Quiet-period debouncer and the real-time auto-save timer
//! - `generation`: Generator capability, template backend, request handler
//! - `catalog`: Content/research types and their default settings
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use copydesk::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let workspace = config.content_workspace();
//!     assert!(workspace.history().is_empty());
//!     Ok(())
//! }
//! ```

pub mod autosave;
pub mod catalog;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod notice;
pub mod session;
pub mod upload;

// Re-export commonly used types
pub use catalog::{ContentType, GenerationSettings, ResearchType, Tone};
pub use config::Config;
pub use error::{CopydeskError, Result};
pub use generation::{GenerationHandler, Generator, TemplateGenerator};
pub use notice::Notice;
pub use session::{ContentWorkspace, ResearchWorkspace, SessionStore};

#[cfg(test)]
pub mod test_utils;
