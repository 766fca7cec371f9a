//! Interactive studio
//!
//! A readline loop hosting the content and research panels. The content
//! workspace is shared with the auto-save timer task; every edit reschedules
//! the single pending timer.

use super::history::{print_content_history, print_research_history};
use super::special_commands::{
    parse_studio_command, print_help, Panel, SessionRef, StudioCommand,
};
use crate::autosave::AutoSaveTimer;
use crate::catalog::{ContentType, ResearchType, Tone};
use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::error::{CopydeskError, Result};
use crate::export::Library;
use crate::generation::{GenerationHandler, Generator};
use crate::notice::Notice;
use crate::session::{
    ContentWorkspace, ResearchWorkspace, Role, SessionRecord, SessionStore, SortOrder,
};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(Option<Notice>),
    Quit,
}

/// Row order of the last history table printed for a panel
///
/// `#n` references resolve against these ids while the store still holds
/// `store_len` sessions.
#[derive(Debug, Clone)]
struct Listing {
    panel: Panel,
    ids: Vec<String>,
    store_len: usize,
}

/// State of one interactive studio
pub struct Studio {
    panel: Panel,
    content: Arc<Mutex<ContentWorkspace>>,
    research: ResearchWorkspace,
    timer: AutoSaveTimer,
    handler: GenerationHandler,
    clipboard: Clipboard,
    library: Library,
    default_content_type: ContentType,
    default_research_type: ResearchType,
    listing: Option<Listing>,
}

impl Studio {
    pub fn new(config: &Config, panel: Panel) -> Self {
        Self::with_parts(
            config,
            panel,
            Arc::new(config.generator()),
            Clipboard::platform(),
        )
    }

    /// Build a studio around a specific generator and clipboard
    pub fn with_parts(
        config: &Config,
        panel: Panel,
        generator: Arc<dyn Generator>,
        clipboard: Clipboard,
    ) -> Self {
        Self {
            panel,
            content: Arc::new(Mutex::new(config.content_workspace())),
            research: config.research_workspace(),
            timer: AutoSaveTimer::new(),
            handler: GenerationHandler::new(generator),
            clipboard,
            library: config.library(),
            default_content_type: config.content.default_type.clone(),
            default_research_type: config.research.default_type.clone(),
            listing: None,
        }
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn content(&self) -> Arc<Mutex<ContentWorkspace>> {
        Arc::clone(&self.content)
    }

    pub fn research(&self) -> &ResearchWorkspace {
        &self.research
    }

    fn prompt_label(&self) -> String {
        match self.panel {
            Panel::Content => format!("[{}]>> ", "content".cyan()),
            Panel::Research => format!("[{}]>> ", "research".magenta()),
        }
    }

    /// Restart the quiet-period timer after an edit
    async fn schedule_autosave(&mut self) {
        let quiet = self.content.lock().await.quiet_period();
        self.timer.reschedule(Arc::clone(&self.content), quiet);
    }

    /// Drop the timer when the workspace no longer has a pending save
    async fn sync_timer(&mut self) {
        if !self.content.lock().await.has_pending_save() {
            self.timer.cancel();
        }
    }

    /// Commit any pending edit and stop the timer
    pub async fn shutdown(&mut self) -> Option<String> {
        self.timer.cancel();
        self.content.lock().await.flush()
    }

    /// Parse and run one line of input
    ///
    /// # Errors
    ///
    /// Returns parse errors and operation failures; the loop turns them into
    /// error notices.
    pub async fn execute(&mut self, line: &str) -> Result<Step> {
        let command = parse_studio_command(line)
            .map_err(|e| CopydeskError::Validation(e.to_string()))?;
        self.run_command(command).await
    }

    async fn run_command(&mut self, command: StudioCommand) -> Result<Step> {
        let notice = match command {
            StudioCommand::Exit => return Ok(Step::Quit),
            StudioCommand::Help => {
                print_help();
                None
            }
            StudioCommand::SwitchPanel(panel) => {
                self.panel = panel;
                Some(Notice::info(format!("Switched to the {} panel", panel)))
            }
            StudioCommand::Text(text) if text.is_empty() => None,
            StudioCommand::Text(text) => match self.panel {
                Panel::Content => self.set_prompt(text).await,
                Panel::Research => Some(self.ask(&text).await?),
            },
            StudioCommand::Prompt(text) => {
                self.require_panel(Panel::Content, "/prompt")?;
                self.set_prompt(text).await
            }
            StudioCommand::Edit(text) => {
                self.require_panel(Panel::Content, "/edit")?;
                let mut ws = self.content.lock().await;
                ws.set_content(text, Instant::now());
                drop(ws);
                self.schedule_autosave().await;
                None
            }
            StudioCommand::Set { key, value } => {
                self.require_panel(Panel::Content, "/set")?;
                Some(self.apply_setting(&key, &value).await?)
            }
            StudioCommand::Generate => {
                self.require_panel(Panel::Content, "/generate")?;
                Some(self.generate().await?)
            }
            StudioCommand::Ask(question) => {
                self.panel = Panel::Research;
                Some(self.ask(&question).await?)
            }
            StudioCommand::New(slug) => Some(self.new_session(slug).await),
            StudioCommand::SetType(slug) => Some(self.set_type(&slug).await?),
            StudioCommand::Show => {
                self.show().await;
                None
            }
            StudioCommand::History(order) => {
                self.list_sessions(None, order).await;
                None
            }
            StudioCommand::Search(query) => {
                self.list_sessions(Some(query.as_str()), SortOrder::Recent).await;
                None
            }
            StudioCommand::Select(target) => Some(self.select(&target).await?),
            StudioCommand::Delete(target) => Some(self.delete(&target).await?),
            StudioCommand::Save(filename) => {
                let text = self.current_text().await;
                let path = self.library.save(&filename, &text)?;
                Some(Notice::success(format!("Saved to {}", path.display())))
            }
            StudioCommand::Copy => {
                let text = self.current_text().await;
                Some(self.clipboard.copy(&text).notice)
            }
            StudioCommand::Attach(path) => {
                self.require_panel(Panel::Research, "/attach")?;
                let file = self.research.attach(&path)?;
                Some(Notice::success(format!(
                    "Attached {} ({}, {})",
                    file.name,
                    file.kind,
                    file.display_size()
                )))
            }
            StudioCommand::Detach(name) => {
                self.require_panel(Panel::Research, "/detach")?;
                if self.research.detach(&name) {
                    Some(Notice::success(format!("Removed {}", name)))
                } else {
                    Some(Notice::info(format!("No attachment named {}", name)))
                }
            }
            StudioCommand::Rate { rating, target } => {
                self.require_panel(Panel::Research, "/rate")?;
                let message_id = self.rating_target(target.as_deref())?;
                self.research.rate_message(&message_id, rating)?;
                Some(Notice::success("Thanks for the feedback"))
            }
        };
        Ok(Step::Continue(notice))
    }

    fn require_panel(&self, panel: Panel, command: &str) -> Result<()> {
        if self.panel == panel {
            Ok(())
        } else {
            Err(CopydeskError::Validation(format!(
                "{} is only available in the {} panel (use /panel {})",
                command, panel, panel
            ))
            .into())
        }
    }

    async fn set_prompt(&mut self, text: String) -> Option<Notice> {
        self.content.lock().await.set_prompt(text, Instant::now());
        self.schedule_autosave().await;
        Some(Notice::info("Prompt updated"))
    }

    async fn apply_setting(&mut self, key: &str, value: &str) -> Result<Notice> {
        let invalid = |what: &str| -> anyhow::Error {
            CopydeskError::Validation(format!("Invalid {}: {}", what, value)).into()
        };
        let parse_flag = |v: &str| match v.to_lowercase().as_str() {
            "on" | "true" | "yes" => Some(true),
            "off" | "false" | "no" => Some(false),
            _ => None,
        };

        let mut ws = self.content.lock().await;
        match key {
            "tone" => {
                let tone = Tone::parse_str(value).ok_or_else(|| invalid("tone"))?;
                ws.update_settings(|s| s.tone = tone);
            }
            "words" | "word_count" => {
                let words: u32 = value.parse().map_err(|_| invalid("word count"))?;
                ws.update_settings(|s| s.word_count = words);
            }
            "language" => ws.update_settings(|s| s.language = value.to_string()),
            "audience" => ws.update_settings(|s| s.target_audience = value.to_string()),
            "keywords" => {
                let keywords: Vec<String> = value
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
                ws.update_settings(|s| s.keywords = keywords);
            }
            "creativity" => {
                let creativity: f32 = value
                    .parse()
                    .ok()
                    .filter(|c: &f32| (0.0..=1.0).contains(c))
                    .ok_or_else(|| invalid("creativity (expected 0.0 to 1.0)"))?;
                ws.update_settings(|s| s.creativity = creativity);
            }
            "seo" => {
                let flag = parse_flag(value).ok_or_else(|| invalid("seo flag"))?;
                ws.update_settings(|s| s.seo_optimized = flag);
            }
            "grammar" => {
                let flag = parse_flag(value).ok_or_else(|| invalid("grammar flag"))?;
                ws.update_settings(|s| s.grammar_check = flag);
            }
            other => {
                return Err(CopydeskError::Validation(format!("Unknown setting: {}", other)).into())
            }
        }
        Ok(Notice::success(format!("Set {} to {}", key, value)))
    }

    async fn generate(&mut self) -> Result<Notice> {
        let mut ws = self.content.lock().await;
        let notice = interruptible(&self.handler, self.handler.generate_content(&mut ws)).await?;
        println!("\n{}\n", ws.draft().content);
        drop(ws);
        self.sync_timer().await;
        Ok(notice)
    }

    async fn ask(&mut self, question: &str) -> Result<Notice> {
        let notice = interruptible(&self.handler, self.handler.ask(&mut self.research, question))
            .await?;
        if let Some(reply) = self.research.messages().last() {
            print_reply(&reply.content, reply.model.as_deref(), reply.tokens);
        }
        Ok(notice)
    }

    async fn new_session(&mut self, slug: Option<String>) -> Notice {
        match self.panel {
            Panel::Content => {
                let content_type = slug
                    .map(|s| ContentType::from_slug(&s))
                    .unwrap_or_else(|| self.default_content_type.clone());
                let label = content_type.label();
                self.content.lock().await.new_session(content_type);
                self.sync_timer().await;
                Notice::info(format!("New {} draft", label))
            }
            Panel::Research => {
                let research_type = slug
                    .map(|s| ResearchType::from_slug(&s))
                    .unwrap_or_else(|| self.default_research_type.clone());
                let label = research_type.label();
                self.research.new_session(research_type);
                Notice::info(format!("New {} thread", label))
            }
        }
    }

    async fn set_type(&mut self, slug: &str) -> Result<Notice> {
        match self.panel {
            Panel::Content => {
                let content_type = ContentType::from_slug(slug);
                let label = content_type.label();
                let mut ws = self.content.lock().await;
                ws.set_type(content_type);
                Ok(Notice::info(format!(
                    "Type set to {} ({} words)",
                    label,
                    ws.draft().settings.word_count
                )))
            }
            Panel::Research => {
                let research_type = ResearchType::from_slug(slug);
                let label = research_type.label();
                self.research.set_type(research_type)?;
                Ok(Notice::info(format!("Type set to {}", label)))
            }
        }
    }

    /// Print the history table for the current panel and remember its rows
    async fn list_sessions(&mut self, query: Option<&str>, order: SortOrder) {
        let listing = match self.panel {
            Panel::Content => {
                let ws = self.content.lock().await;
                let sessions = match query {
                    Some(q) => ws.search(q, order),
                    None => ws.history_sorted(order),
                };
                print_content_history(&sessions, ws.active_id());
                Listing {
                    panel: Panel::Content,
                    ids: sessions.iter().map(|s| s.id.clone()).collect(),
                    store_len: ws.store().len(),
                }
            }
            Panel::Research => {
                let sessions = match query {
                    Some(q) => self.research.search(q, order),
                    None => self.research.history_sorted(order),
                };
                print_research_history(&sessions, self.research.active_id());
                Listing {
                    panel: Panel::Research,
                    ids: sessions.iter().map(|s| s.id.clone()).collect(),
                    store_len: self.research.store().len(),
                }
            }
        };
        self.listing = Some(listing);
    }

    /// Rows of the last table printed for `panel`, if the store has not grown
    /// or shrunk since
    fn listed(&self, panel: Panel, store_len: usize) -> Option<&[String]> {
        self.listing
            .as_ref()
            .filter(|l| l.panel == panel && l.store_len == store_len)
            .map(|l| l.ids.as_slice())
    }

    fn forget_listed(&mut self, id: &str) {
        if let Some(listing) = self.listing.as_mut() {
            if listing.panel == self.panel {
                listing.ids.retain(|listed| listed != id);
                listing.store_len = listing.store_len.saturating_sub(1);
            }
        }
    }

    async fn select(&mut self, target: &SessionRef) -> Result<Notice> {
        match self.panel {
            Panel::Content => {
                let mut ws = self.content.lock().await;
                let listed = self.listed(Panel::Content, ws.store().len());
                let id = resolve(ws.store(), listed, target)?;
                ws.select(&id);
                let prompt = ws.draft().prompt.clone();
                drop(ws);
                self.sync_timer().await;
                Ok(Notice::info(format!("Opened \"{}\"", prompt)))
            }
            Panel::Research => {
                let listed = self.listed(Panel::Research, self.research.store().len());
                let id = resolve(self.research.store(), listed, target)?;
                self.research.select(&id);
                let title = self
                    .research
                    .store()
                    .get(&id)
                    .map(|s| s.title.clone())
                    .unwrap_or_default();
                Ok(Notice::info(format!("Opened \"{}\"", title)))
            }
        }
    }

    async fn delete(&mut self, target: &SessionRef) -> Result<Notice> {
        let id = match self.panel {
            Panel::Content => {
                let mut ws = self.content.lock().await;
                let listed = self.listed(Panel::Content, ws.store().len());
                let id = resolve(ws.store(), listed, target)?;
                ws.delete(&id)?;
                drop(ws);
                self.sync_timer().await;
                id
            }
            Panel::Research => {
                let listed = self.listed(Panel::Research, self.research.store().len());
                let id = resolve(self.research.store(), listed, target)?;
                self.research.delete(&id)?;
                id
            }
        };
        self.forget_listed(&id);
        Ok(Notice::success("Session deleted"))
    }

    fn rating_target(&self, target: Option<&str>) -> Result<String> {
        let messages = self.research.messages();
        let found = match target {
            Some(prefix) => {
                let prefix = prefix.to_uppercase();
                messages
                    .iter()
                    .find(|m| m.id.to_uppercase().starts_with(&prefix))
            }
            None => messages.iter().rev().find(|m| m.role == Role::Assistant),
        };
        found.map(|m| m.id.clone()).ok_or_else(|| {
            CopydeskError::Validation("No reply to rate".to_string()).into()
        })
    }

    /// Text used by /save and /copy for the active panel
    async fn current_text(&self) -> String {
        match self.panel {
            Panel::Content => self.content.lock().await.draft().content.clone(),
            Panel::Research => transcript(&self.research),
        }
    }

    async fn show(&self) {
        match self.panel {
            Panel::Content => {
                let ws = self.content.lock().await;
                let draft = ws.draft();
                println!(
                    "{} {} | {} | {} words | {}",
                    "Type:".bold(),
                    draft.content_type.label(),
                    draft.settings.tone,
                    draft.settings.word_count,
                    draft.settings.language
                );
                println!("{} {}", "Prompt:".bold(), draft.prompt);
                println!("\n{}\n", draft.content);
            }
            Panel::Research => {
                println!(
                    "{} {}",
                    "Type:".bold(),
                    self.research.research_type().label()
                );
                for file in self.research.attachments() {
                    println!("  📎 {} ({})", file.name, file.display_size());
                }
                for message in self.research.messages() {
                    let role = match message.role {
                        Role::User => "You".cyan().bold(),
                        Role::Assistant => "Assistant".magenta().bold(),
                    };
                    println!("\n{} [{}]\n{}", role, &message.id, message.content);
                }
                println!();
            }
        }
    }
}

/// Run a generation future, cancelling it on Ctrl-C
async fn interruptible<F, T>(handler: &GenerationHandler, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::pin!(fut);
    loop {
        tokio::select! {
            result = &mut fut => return result,
            _ = tokio::signal::ctrl_c() => {
                handler.cancel();
            }
        }
    }
}

/// Resolve a history position or id prefix to a stored session id
///
/// Positions count rows of `listed` when a table has been printed, and store
/// order otherwise.
fn resolve<S: SessionRecord>(
    store: &SessionStore<S>,
    listed: Option<&[String]>,
    target: &SessionRef,
) -> Result<String> {
    let id = match target {
        SessionRef::Position(position) => {
            let index = position.checked_sub(1);
            match listed {
                Some(ids) => index
                    .and_then(|i| ids.get(i))
                    .filter(|id| store.get(id).is_some())
                    .cloned(),
                None => index
                    .and_then(|i| store.iter().nth(i))
                    .map(|s| s.id().to_string()),
            }
        }
        SessionRef::Id(prefix) => store.resolve(prefix).map(str::to_string),
    };
    id.ok_or_else(|| {
        let shown = match target {
            SessionRef::Position(p) => format!("#{}", p),
            SessionRef::Id(prefix) => prefix.clone(),
        };
        CopydeskError::Validation(format!("No session matches {}", shown)).into()
    })
}

/// Plain-text transcript of the working research thread
pub fn transcript(workspace: &ResearchWorkspace) -> String {
    workspace
        .messages()
        .iter()
        .map(|m| match m.role {
            Role::User => format!("Q: {}", m.content),
            Role::Assistant => format!("A: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn print_reply(content: &str, model: Option<&str>, tokens: Option<u32>) {
    println!("\n{}\n", content);
    if let (Some(model), Some(tokens)) = (model, tokens) {
        println!("{}", format!("{} · ~{} tokens", model, tokens).dimmed());
    }
}

fn print_welcome_banner(panel: Panel, library: &Path) {
    println!("{}", "Copydesk Studio".bold());
    println!("Panel: {}  |  Library: {}", panel, library.display());
    println!("Type {} for commands, {} to leave.\n", "/help".cyan(), "/quit".cyan());
}

/// Start the interactive studio
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `panel` - Panel to open first ("content" or "research")
pub async fn run_studio(config: Config, panel: &str) -> Result<()> {
    let panel = Panel::parse_str(panel).map_err(CopydeskError::Validation)?;
    let mut studio = Studio::new(&config, panel);
    let mut rl = DefaultEditor::new()?;

    print_welcome_banner(panel, studio.library.dir());

    loop {
        match rl.readline(&studio.prompt_label()) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                match studio.execute(&line).await {
                    Ok(Step::Quit) => break,
                    Ok(Step::Continue(Some(notice))) => println!("{}", notice.render()),
                    Ok(Step::Continue(None)) => {}
                    Err(e) => {
                        tracing::debug!(error = %e, "Studio command failed");
                        println!("{}", Notice::from_error(&e).render());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Use /quit to exit");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                tracing::error!("Error reading input: {:?}", err);
                break;
            }
        }
    }

    if let Some(id) = studio.shutdown().await {
        tracing::info!(session_id = %id, "Saved pending draft before exit");
    }
    println!("Goodbye!");
    Ok(())
}
