//! Slash command parser for the interactive studio
//!
//! Commands are prefixed with `/`. The command word is case-insensitive;
//! arguments keep their case. Anything that does not start with `/` is
//! returned as [`StudioCommand::Text`] for the active panel to interpret.

use crate::session::{Rating, SortOrder};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing studio commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// The two studio panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Content,
    Research,
}

impl Panel {
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "content" | "generator" => Ok(Self::Content),
            "research" | "chat" => Ok(Self::Research),
            other => Err(format!("Unknown panel: {}", other)),
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Research => write!(f, "research"),
        }
    }
}

/// A reference to a stored session: a history position or an id prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    /// 1-based position in the most-recent-first history (`#2`)
    Position(usize),
    /// Full id or unique id prefix
    Id(String),
}

impl SessionRef {
    fn parse(arg: &str) -> Self {
        match arg.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
            Some(position) => Self::Position(position),
            None => Self::Id(arg.to_string()),
        }
    }
}

/// Commands understood by the studio loop
#[derive(Debug, Clone, PartialEq)]
pub enum StudioCommand {
    /// Start a new session, optionally of a given type
    New(Option<String>),
    /// Change the working type
    SetType(String),
    /// Replace the draft prompt
    Prompt(String),
    /// Replace the draft body
    Edit(String),
    /// Change one generation setting
    Set { key: String, value: String },
    /// Generate content for the draft
    Generate,
    /// Ask a research question
    Ask(String),
    /// Print the current draft or thread
    Show,
    History(SortOrder),
    Search(String),
    Select(SessionRef),
    Delete(SessionRef),
    /// Save the current text to the library
    Save(String),
    /// Copy the current text to the clipboard
    Copy,
    Attach(PathBuf),
    Detach(String),
    /// Rate the latest reply, or the message whose id starts with `target`
    Rate {
        rating: Rating,
        target: Option<String>,
    },
    SwitchPanel(Panel),
    Help,
    Exit,
    /// Plain text, interpreted by the active panel
    Text(String),
}

fn required(command: &str, usage: &str, arg: &str) -> Result<String, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(arg.to_string())
    }
}

/// Parse a line of studio input
///
/// # Errors
///
/// Returns CommandError::UnknownCommand for unrecognized `/` commands,
/// CommandError::MissingArgument when a required argument is absent, and
/// CommandError::UnsupportedArgument for invalid argument values.
///
/// # Examples
///
/// ```
/// use copydesk::commands::special_commands::{parse_studio_command, Panel, StudioCommand};
///
/// let cmd = parse_studio_command("/prompt Write about Coffee").unwrap();
/// assert_eq!(cmd, StudioCommand::Prompt("Write about Coffee".to_string()));
///
/// let cmd = parse_studio_command("/panel research").unwrap();
/// assert_eq!(cmd, StudioCommand::SwitchPanel(Panel::Research));
///
/// let cmd = parse_studio_command("who buys oat milk?").unwrap();
/// assert_eq!(cmd, StudioCommand::Text("who buys oat milk?".to_string()));
///
/// assert!(parse_studio_command("/foo").is_err());
/// ```
pub fn parse_studio_command(input: &str) -> Result<StudioCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(StudioCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(StudioCommand::Text(trimmed.to_string()));
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/new" => Ok(StudioCommand::New(
            (!arg.is_empty()).then(|| arg.to_string()),
        )),
        "/type" => required("/type", "/type <slug>", arg).map(StudioCommand::SetType),
        "/prompt" => required("/prompt", "/prompt <text>", arg).map(StudioCommand::Prompt),
        "/edit" => required("/edit", "/edit <text>", arg).map(StudioCommand::Edit),
        "/set" => {
            let usage = "/set <tone|words|language|audience|keywords|creativity|seo|grammar> <value>";
            match arg.split_once(char::is_whitespace) {
                Some((key, value)) => Ok(StudioCommand::Set {
                    key: key.to_lowercase(),
                    value: value.trim().to_string(),
                }),
                None => Err(CommandError::MissingArgument {
                    command: "/set".to_string(),
                    usage: usage.to_string(),
                }),
            }
        }
        "/generate" | "/gen" => Ok(StudioCommand::Generate),
        "/ask" => required("/ask", "/ask <question>", arg).map(StudioCommand::Ask),
        "/show" => Ok(StudioCommand::Show),
        "/history" | "/list" => {
            if arg.is_empty() {
                Ok(StudioCommand::History(SortOrder::Recent))
            } else {
                SortOrder::parse_str(arg)
                    .map(StudioCommand::History)
                    .map_err(|_| CommandError::UnsupportedArgument {
                        command: "/history".to_string(),
                        arg: arg.to_string(),
                    })
            }
        }
        "/search" => required("/search", "/search <text>", arg).map(StudioCommand::Search),
        "/select" | "/open" => required("/select", "/select <#n|id>", arg)
            .map(|a| StudioCommand::Select(SessionRef::parse(&a))),
        "/delete" | "/rm" => required("/delete", "/delete <#n|id>", arg)
            .map(|a| StudioCommand::Delete(SessionRef::parse(&a))),
        "/save" => required("/save", "/save <filename>", arg).map(StudioCommand::Save),
        "/copy" => Ok(StudioCommand::Copy),
        "/attach" => required("/attach", "/attach <path>", arg)
            .map(|a| StudioCommand::Attach(PathBuf::from(a))),
        "/detach" => required("/detach", "/detach <filename>", arg).map(StudioCommand::Detach),
        "/rate" => {
            let mut parts = arg.split_whitespace();
            let rating = parts.next().ok_or_else(|| CommandError::MissingArgument {
                command: "/rate".to_string(),
                usage: "/rate <up|down> [message-id]".to_string(),
            })?;
            let rating = Rating::parse_str(rating).map_err(|_| CommandError::UnsupportedArgument {
                command: "/rate".to_string(),
                arg: rating.to_string(),
            })?;
            Ok(StudioCommand::Rate {
                rating,
                target: parts.next().map(str::to_string),
            })
        }
        "/panel" => {
            let arg = required("/panel", "/panel <content|research>", arg)?;
            Panel::parse_str(&arg)
                .map(StudioCommand::SwitchPanel)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/panel".to_string(),
                    arg,
                })
        }
        "/content" => Ok(StudioCommand::SwitchPanel(Panel::Content)),
        "/research" => Ok(StudioCommand::SwitchPanel(Panel::Research)),
        "/help" | "/?" => Ok(StudioCommand::Help),
        "/quit" | "/exit" => Ok(StudioCommand::Exit),
        _ => Err(CommandError::UnknownCommand(word)),
    }
}

/// Print studio help
pub fn print_help() {
    println!(
        r#"
Studio Commands
===============

SESSIONS:
  /new [type]       - Start a new session (optionally of a type)
  /type <slug>      - Change the working content/research type
  /history [order]  - List sessions (recent, oldest, title)
  /search <text>    - Find sessions containing text
  /select <#n|id>   - Open a session by history position or id prefix
  /delete <#n|id>   - Delete a session

CONTENT PANEL:
  /prompt <text>    - Set the prompt
  /edit <text>      - Replace the draft body
  /set <key> <val>  - Change a setting (tone, words, language, audience,
                      keywords, creativity, seo, grammar)
  /generate         - Generate content for the prompt
  /show             - Print the current draft

RESEARCH PANEL:
  /ask <question>   - Ask a question (plain text works too)
  /rate <up|down> [message-id] - Rate the latest reply or a given message
  /attach <path>    - Attach a file (metadata only)
  /detach <name>    - Remove an attachment

OUTPUT:
  /save <filename>  - Save the current text to the library (.txt)
  /copy             - Copy the current text to the clipboard

STUDIO:
  /panel <content|research> - Switch panels (/content, /research)
  /help             - Show this help message
  /quit             - Exit (pending edits are saved first)

NOTES:
  - Drafts are saved automatically after a short pause in editing
  - Research threads are saved after every reply
  - Plain text in the content panel sets the prompt
"#
    );
}
