//! Command-line interface definition for Copydesk
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for one-shot generation, research questions, the
//! interactive studio, and the type catalog.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Copydesk - marketing copy and research studio
///
/// Draft marketing content and research notes with session history and
/// automatic saving.
#[derive(Parser, Debug, Clone)]
#[command(name = "copydesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the directory used by "save to library"
    #[arg(long, global = true)]
    pub library_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Copydesk
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate one piece of content and print it
    Generate {
        /// Content type slug (blog-post, ad-copy, ...); defaults to the configured type
        #[arg(short = 't', long = "type")]
        content_type: Option<String>,

        /// What the content should be about
        #[arg(short, long)]
        prompt: String,

        /// Tone of voice (professional, casual, friendly, ...)
        #[arg(long)]
        tone: Option<String>,

        /// Target word count; defaults to the type's default
        #[arg(short, long)]
        words: Option<u32>,

        /// Comma-separated keywords to work in
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,

        /// Target audience
        #[arg(short, long)]
        audience: Option<String>,

        /// Save the result to the library under this file name
        #[arg(long)]
        save: Option<String>,

        /// Copy the result to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Ask a single research question
    Research {
        /// Research type slug (market-analysis, keyword-research, ...)
        #[arg(short = 't', long = "type")]
        research_type: Option<String>,

        /// Files to attach (metadata only)
        #[arg(long)]
        attach: Vec<PathBuf>,

        /// The question to research
        question: String,
    },

    /// Start the interactive studio
    Studio {
        /// Panel to open first: content or research
        #[arg(short, long, default_value = "content")]
        panel: String,
    },

    /// List content and research types with their defaults
    Types {
        /// Output the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            library_dir: None,
            command: Commands::Types { json: false },
        }
    }
}
