/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes the top-level command modules:

- `generate` - One-shot content generation
- `research` - A single research question
- `studio`   - Interactive content and research studio
- `types`    - Content and research type catalog

The handlers are thin: they build workspaces from the configuration and
delegate to the session and generation components.
*/

use crate::catalog::{ContentType, ResearchType, Tone};
use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::error::{CopydeskError, Result};
use crate::generation::{GenerationHandler, Generator};
use std::path::PathBuf;
use std::sync::Arc;

// Slash-command parser for the studio
pub mod special_commands;

// History tables
pub mod history;

// Interactive studio loop
pub mod studio;

/// One-shot generation command
pub mod generate {
    use super::*;
    use crate::session::ContentWorkspace;

    /// Options collected from the `generate` subcommand
    #[derive(Debug, Clone, Default)]
    pub struct GenerateArgs {
        pub content_type: Option<String>,
        pub prompt: String,
        pub tone: Option<String>,
        pub words: Option<u32>,
        pub keywords: Vec<String>,
        pub audience: Option<String>,
        pub save: Option<String>,
        pub copy: bool,
    }

    /// Build a draft from `args` and run one generation on it
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::Validation`] for an unknown tone, a zero word
    /// count or a blank prompt, and any generation failure.
    pub async fn generate_draft(
        config: &Config,
        args: &GenerateArgs,
        generator: Arc<dyn Generator>,
    ) -> Result<ContentWorkspace> {
        let tone = args
            .tone
            .as_deref()
            .map(|t| {
                Tone::parse_str(t)
                    .ok_or_else(|| CopydeskError::Validation(format!("Unknown tone: {}", t)))
            })
            .transpose()?;
        if args.words == Some(0) {
            return Err(
                CopydeskError::Validation("Word count must be greater than 0".to_string()).into(),
            );
        }

        let content_type = args
            .content_type
            .as_deref()
            .map(ContentType::from_slug)
            .unwrap_or_else(|| config.content.default_type.clone());

        let mut workspace = config.content_workspace();
        workspace.new_session(content_type);
        workspace.update_settings(|s| {
            if let Some(tone) = tone {
                s.tone = tone;
            }
            if let Some(words) = args.words {
                s.word_count = words;
            }
            if !args.keywords.is_empty() {
                s.keywords = args.keywords.clone();
            }
            if let Some(audience) = &args.audience {
                s.target_audience = audience.clone();
            }
        });
        workspace.set_prompt(args.prompt.clone(), tokio::time::Instant::now());

        let handler = GenerationHandler::new(generator);
        let notice = handler.generate_content(&mut workspace).await?;
        tracing::debug!(notice = %notice, "Generation finished");
        Ok(workspace)
    }

    /// Generate one piece of content, print it, then save or copy it
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `args` - Parsed subcommand options
    pub async fn run_generate(config: Config, args: GenerateArgs) -> Result<()> {
        let generator: Arc<dyn Generator> = Arc::new(config.generator());
        let workspace = generate_draft(&config, &args, generator).await?;
        let text = &workspace.draft().content;

        println!("{}", text);

        if let Some(filename) = &args.save {
            let path = config.library().save(filename, text)?;
            eprintln!("Saved to {}", path.display());
        }
        if args.copy {
            let outcome = Clipboard::platform().copy(text);
            eprintln!("{}", outcome.notice.render());
        }
        Ok(())
    }

}

/// Single research question command
pub mod research {
    use super::*;
    use crate::session::ResearchWorkspace;
    use colored::Colorize;

    /// Attach files, ask `question` and return the workspace holding the thread
    pub async fn ask_once(
        config: &Config,
        research_type: Option<&str>,
        attach: &[PathBuf],
        question: &str,
        generator: Arc<dyn Generator>,
    ) -> Result<ResearchWorkspace> {
        let mut workspace = config.research_workspace();
        if let Some(slug) = research_type {
            workspace.set_type(ResearchType::from_slug(slug))?;
        }
        for path in attach {
            workspace.attach(path)?;
        }

        let handler = GenerationHandler::new(generator);
        handler.ask(&mut workspace, question).await?;
        Ok(workspace)
    }

    /// Ask a single research question and print the reply
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `research_type` - Optional research type slug
    /// * `attach` - Files whose metadata accompanies the question
    /// * `question` - The question to research
    pub async fn run_research(
        config: Config,
        research_type: Option<String>,
        attach: Vec<PathBuf>,
        question: String,
    ) -> Result<()> {
        let generator: Arc<dyn Generator> = Arc::new(config.generator());
        let workspace =
            ask_once(&config, research_type.as_deref(), &attach, &question, generator).await?;

        for file in workspace.attachments() {
            eprintln!("Attached {} ({}, {})", file.name, file.kind, file.display_size());
        }
        if let Some(reply) = workspace.messages().last() {
            println!("{}", reply.content);
            if let (Some(model), Some(tokens)) = (&reply.model, reply.tokens) {
                eprintln!("{}", format!("{} · ~{} tokens", model, tokens).dimmed());
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::generation::TemplateGenerator;
        use crate::session::Role;

        #[tokio::test]
        async fn test_ask_once_uses_requested_type() {
            let ws = ask_once(
                &Config::default(),
                Some("keyword-research"),
                &[],
                "Which terms rank for cold brew?",
                Arc::new(TemplateGenerator::instant()),
            )
            .await
            .unwrap();
            assert_eq!(ws.research_type(), &ResearchType::KeywordResearch);
            assert_eq!(ws.messages().len(), 2);
            assert_eq!(ws.messages()[1].role, Role::Assistant);
            assert_eq!(ws.history().len(), 1);
        }

        #[tokio::test]
        async fn test_ask_once_missing_attachment_fails() {
            let res = ask_once(
                &Config::default(),
                None,
                &[PathBuf::from("/definitely/not/here.pdf")],
                "Question",
                Arc::new(TemplateGenerator::instant()),
            )
            .await;
            assert!(res.is_err());
        }
    }
}

/// Type catalog command
pub mod types {
    use super::*;
    use colored::Colorize;
    use prettytable::{format, Table};
    use serde::Serialize;

    /// One catalog entry as emitted by `types --json`
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TypeEntry {
        pub slug: String,
        pub label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub default_word_count: Option<u32>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub focus_areas: Vec<String>,
    }

    /// Both catalogs, keyed by workspace
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Catalog {
        pub content: Vec<TypeEntry>,
        pub research: Vec<TypeEntry>,
    }

    pub fn catalog() -> Catalog {
        Catalog {
            content: ContentType::ALL
                .iter()
                .map(|t| TypeEntry {
                    slug: t.slug().to_string(),
                    label: t.label().to_string(),
                    default_word_count: Some(t.default_word_count()),
                    focus_areas: Vec::new(),
                })
                .collect(),
            research: ResearchType::ALL
                .iter()
                .map(|t| TypeEntry {
                    slug: t.slug().to_string(),
                    label: t.label().to_string(),
                    default_word_count: None,
                    focus_areas: t.focus_areas().iter().map(|a| a.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Print the content and research type catalogs
    ///
    /// # Arguments
    ///
    /// * `json` - Emit pretty-printed JSON instead of tables
    pub fn print_types(json: bool) -> Result<()> {
        let catalog = catalog();
        if json {
            let out =
                serde_json::to_string_pretty(&catalog).map_err(CopydeskError::Serialization)?;
            println!("{}", out);
            return Ok(());
        }

        let mut content = Table::new();
        content.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        content.add_row(prettytable::row![
            "Slug".bold(),
            "Content Type".bold(),
            "Default Words".bold()
        ]);
        for entry in &catalog.content {
            content.add_row(prettytable::row![
                entry.slug.cyan(),
                entry.label,
                entry.default_word_count.unwrap_or_default()
            ]);
        }

        let mut research = Table::new();
        research.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        research.add_row(prettytable::row![
            "Slug".bold(),
            "Research Type".bold(),
            "Focus Areas".bold()
        ]);
        for entry in &catalog.research {
            research.add_row(prettytable::row![
                entry.slug.cyan(),
                entry.label,
                entry.focus_areas.join(", ")
            ]);
        }

        println!("\nContent Types:");
        content.printstd();
        println!("\nResearch Types:");
        research.printstd();
        println!();
        println!(
            "Unknown slugs are accepted and use the {} label.",
            "Other".cyan()
        );
        Ok(())
    }

}
