//! Research chat workspace
//!
//! Multi-turn message threads keyed by research type. Unlike the content
//! panel, a thread is committed synchronously after every completed turn.

use super::store::{
    new_session_id, ActiveChange, DeletePolicy, SessionRecord, SessionStore, SortOrder,
};
use crate::catalog::ResearchType;
use crate::error::{CopydeskError, Result};
use crate::upload::UploadedFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Maximum number of characters kept from the question in a thread title
pub const TITLE_MAX_CHARS: usize = 50;

/// Sender of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Feedback left on an assistant message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "up" | "+" | "good" => Ok(Self::Up),
            "down" | "-" | "bad" => Ok(Self::Down),
            other => Err(format!("Unknown rating: {}", other)),
        }
    }
}

/// One turn of a research thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use copydesk::session::{Message, Role};
    ///
    /// let msg = Message::user("Who buys oat milk?");
    /// assert_eq!(msg.role, Role::User);
    /// assert!(msg.model.is_none());
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: new_session_id(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            model: None,
            tokens: None,
            rating: None,
        }
    }

    /// Creates a new assistant message carrying model and token metadata
    pub fn assistant(content: impl Into<String>, model: impl Into<String>, tokens: u32) -> Self {
        Self {
            id: new_session_id(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            model: Some(model.into()),
            tokens: Some(tokens),
            rating: None,
        }
    }
}

/// A persisted research thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSession {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub research_type: ResearchType,
    pub messages: Vec<Message>,
    pub last_activity: DateTime<Utc>,
}

impl SessionRecord for ResearchSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn last_write(&self) -> DateTime<Utc> {
        self.last_activity
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .messages
                .iter()
                .any(|m| m.content.to_lowercase().contains(needle))
    }
}

/// Derive a thread title from its originating question
///
/// Keeps the first 50 characters and appends `...` when the question is
/// longer.
///
/// # Examples
///
/// ```
/// use copydesk::session::derive_title;
///
/// assert_eq!(derive_title("  Who buys oat milk?  "), "Who buys oat milk?");
/// let long = "a".repeat(60);
/// assert_eq!(derive_title(&long), format!("{}...", "a".repeat(50)));
/// ```
pub fn derive_title(question: &str) -> String {
    let question = question.trim();
    if question.chars().count() > TITLE_MAX_CHARS {
        let head: String = question.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        question.to_string()
    }
}

/// Research session manager
#[derive(Debug, Clone)]
pub struct ResearchWorkspace {
    store: SessionStore<ResearchSession>,
    messages: Vec<Message>,
    research_type: ResearchType,
    attachments: Vec<UploadedFile>,
}

impl ResearchWorkspace {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            store: SessionStore::new(policy),
            messages: Vec::new(),
            research_type: ResearchType::default(),
            attachments: Vec::new(),
        }
    }

    pub fn with_default_type(mut self, research_type: ResearchType) -> Self {
        self.research_type = research_type;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn research_type(&self) -> &ResearchType {
        &self.research_type
    }

    /// Set the type of the working thread
    ///
    /// A thread's type is fixed once it has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::Validation`] when the working thread is
    /// already in the store.
    pub fn set_type(&mut self, research_type: ResearchType) -> Result<()> {
        if self.store.active_id().is_some() {
            return Err(CopydeskError::Validation(
                "Research type is fixed once a thread is saved; start a new thread to change it"
                    .to_string(),
            )
            .into());
        }
        self.research_type = research_type;
        Ok(())
    }

    pub fn store(&self) -> &SessionStore<ResearchSession> {
        &self.store
    }

    pub fn active_id(&self) -> Option<&str> {
        self.store.active_id()
    }

    pub fn attachments(&self) -> &[UploadedFile] {
        &self.attachments
    }

    /// The question that opened the current thread
    pub fn originating_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Validate and append a user question to the working thread
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::Validation`] when the question is blank.
    pub fn push_question(&mut self, question: &str) -> Result<&Message> {
        if question.trim().is_empty() {
            return Err(CopydeskError::Validation("Please enter a question".to_string()).into());
        }
        self.messages.push(Message::user(question.trim()));
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Remove the trailing user question after a failed turn
    pub fn retract_question(&mut self, message_id: &str) {
        if self
            .messages
            .last()
            .is_some_and(|m| m.id == message_id && m.role == Role::User)
        {
            self.messages.pop();
        }
    }

    /// Append an assistant reply and commit the thread
    pub fn push_reply(&mut self, reply: Message) -> Option<String> {
        self.messages.push(reply);
        self.commit()
    }

    /// Write the working thread to the store
    ///
    /// Skipped when there are no messages or the originating question is blank.
    pub fn commit(&mut self) -> Option<String> {
        let prompt = self.originating_prompt().unwrap_or_default();
        let body_present = self.messages.iter().any(|m| !m.content.trim().is_empty());
        if !body_present || prompt.trim().is_empty() {
            debug!("Skipping research auto-save: thread or question is blank");
            return None;
        }

        let id = self
            .store
            .active_id()
            .map(str::to_string)
            .unwrap_or_else(new_session_id);
        let session = ResearchSession {
            id: id.clone(),
            title: derive_title(prompt),
            research_type: self.research_type.clone(),
            messages: self.messages.clone(),
            last_activity: Utc::now(),
        };
        self.store.upsert(session);
        debug!(session_id = %id, messages = self.messages.len(), "Committed research session");
        Some(id)
    }

    /// Make a stored thread active and load its messages
    pub fn select(&mut self, id: &str) -> bool {
        match self.store.select(id) {
            Some(session) => {
                self.messages = session.messages.clone();
                self.research_type = session.research_type.clone();
                self.attachments.clear();
                info!(session_id = %id, "Selected research session");
                true
            }
            None => false,
        }
    }

    /// Delete a stored thread
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::LastSession`] when only one thread remains
    /// under the keep-last policy, and [`CopydeskError::Validation`] for an
    /// unknown id.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let deletion = self.store.delete(id)?.ok_or_else(|| {
            CopydeskError::Validation(format!("No research session with id {}", id))
        })?;
        match deletion.active {
            ActiveChange::Unchanged => {}
            ActiveChange::Reselected(next) => {
                if let Some(session) = self.store.get(&next) {
                    self.messages = session.messages.clone();
                    self.research_type = session.research_type.clone();
                }
                self.attachments.clear();
            }
            ActiveChange::Cleared => {
                self.messages.clear();
                self.attachments.clear();
            }
        }
        info!(session_id = %id, remaining = self.store.len(), "Deleted research session");
        Ok(())
    }

    /// Start an empty thread of `research_type`; stored on its first commit
    pub fn new_session(&mut self, research_type: ResearchType) {
        self.store.clear_active();
        self.messages.clear();
        self.attachments.clear();
        self.research_type = research_type;
        info!(research_type = %self.research_type, "Started new research session");
    }

    /// Rate a message in the working thread and in its stored snapshot
    ///
    /// The stored session keeps its position; only the rating changes.
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::Validation`] when the message is not part of
    /// the working thread.
    pub fn rate_message(&mut self, message_id: &str, rating: Rating) -> Result<()> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| {
                CopydeskError::Validation(format!("No message with id {}", message_id))
            })?;
        message.rating = Some(rating);

        if let Some(active) = self.store.active_id().map(str::to_string) {
            self.store.update(&active, |session| {
                if let Some(stored) = session.messages.iter_mut().find(|m| m.id == message_id) {
                    stored.rating = Some(rating);
                }
            });
        }
        debug!(message_id, ?rating, "Rated message");
        Ok(())
    }

    /// Record a file's metadata on the working thread
    pub fn attach(&mut self, path: impl AsRef<Path>) -> Result<&UploadedFile> {
        let file = UploadedFile::from_path(path)?;
        info!(name = %file.name, kind = %file.kind, size = file.size, "Attached file");
        self.attachments.push(file);
        Ok(&self.attachments[self.attachments.len() - 1])
    }

    /// Remove an attachment by file name, returning whether one was removed
    pub fn detach(&mut self, name: &str) -> bool {
        let before = self.attachments.len();
        self.attachments.retain(|f| f.name != name);
        before != self.attachments.len()
    }

    pub fn history_sorted(&self, order: SortOrder) -> Vec<&ResearchSession> {
        self.store.list(order)
    }

    pub fn history(&self) -> Vec<&ResearchSession> {
        self.store.list(SortOrder::Recent)
    }

    pub fn search(&self, query: &str, order: SortOrder) -> Vec<&ResearchSession> {
        self.store.search(query, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn workspace() -> ResearchWorkspace {
        ResearchWorkspace::new(DeletePolicy::KeepLast)
    }

    fn thread(ws: &mut ResearchWorkspace, question: &str) -> String {
        ws.new_session(ResearchType::MarketAnalysis);
        ws.push_question(question).unwrap();
        ws.push_reply(Message::assistant("Findings...", "copydesk-template", 12))
            .expect("commit")
    }

    #[test]
    fn test_reply_commits_synchronously() {
        let mut ws = workspace();
        let id = thread(&mut ws, "Who buys cold brew?");
        let history = ws.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, id);
        assert_eq!(history[0].title, "Who buys cold brew?");
        assert_eq!(history[0].messages.len(), 2);
    }

    #[test]
    fn test_follow_up_updates_same_session() {
        let mut ws = workspace();
        let id = thread(&mut ws, "First question");
        ws.push_question("Follow-up").unwrap();
        let again = ws
            .push_reply(Message::assistant("More", "copydesk-template", 3))
            .unwrap();
        assert_eq!(id, again);
        assert_eq!(ws.history().len(), 1);
        assert_eq!(ws.history()[0].messages.len(), 4);
        assert_eq!(ws.history()[0].title, "First question");
    }

    #[test]
    fn test_title_truncates_long_question() {
        let question = "x".repeat(80);
        let mut ws = workspace();
        thread(&mut ws, &question);
        let title = &ws.history()[0].title;
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_blank_question_rejected() {
        let mut ws = workspace();
        assert!(ws.push_question("   ").is_err());
        assert!(ws.messages().is_empty());
        assert!(ws.commit().is_none());
    }

    #[test]
    fn test_delete_non_active_keeps_active() {
        let mut ws = workspace();
        let older = thread(&mut ws, "Older");
        let newer = thread(&mut ws, "Newer");
        assert_eq!(ws.active_id(), Some(newer.as_str()));

        ws.delete(&older).unwrap();
        assert_eq!(ws.history().len(), 1);
        assert_eq!(ws.active_id(), Some(newer.as_str()));
    }

    #[test]
    fn test_delete_sole_session_rejected() {
        let mut ws = workspace();
        let id = thread(&mut ws, "Only");
        let err = ws.delete(&id).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CopydeskError>(),
            Some(CopydeskError::LastSession)
        ));
        assert_eq!(ws.history().len(), 1);
    }

    #[test]
    fn test_delete_active_loads_front_thread() {
        let mut ws = workspace();
        let older = thread(&mut ws, "Older");
        let newer = thread(&mut ws, "Newer");
        ws.delete(&newer).unwrap();
        assert_eq!(ws.active_id(), Some(older.as_str()));
        assert_eq!(ws.originating_prompt(), Some("Older"));
    }

    #[test]
    fn test_rate_up_then_down_last_write_wins() {
        let mut ws = workspace();
        let id = thread(&mut ws, "Rate me");
        let reply = ws.messages()[1].clone();

        ws.rate_message(&reply.id, Rating::Up).unwrap();
        ws.rate_message(&reply.id, Rating::Down).unwrap();

        let stored = ws.store().get(&id).unwrap();
        let stored_reply = &stored.messages[1];
        assert_eq!(stored_reply.rating, Some(Rating::Down));
        assert_eq!(stored_reply.content, reply.content);
        assert_eq!(stored_reply.model, reply.model);
        assert_eq!(stored_reply.tokens, reply.tokens);
        assert_eq!(ws.messages()[1].rating, Some(Rating::Down));
    }

    #[test]
    fn test_rate_unknown_message_fails() {
        let mut ws = workspace();
        thread(&mut ws, "Q");
        assert!(ws.rate_message("nope", Rating::Up).is_err());
    }

    #[test]
    fn test_retract_question_only_removes_trailing_user_message() {
        let mut ws = workspace();
        let id = ws.push_question("Pending").unwrap().id.clone();
        ws.retract_question("other");
        assert_eq!(ws.messages().len(), 1);
        ws.retract_question(&id);
        assert!(ws.messages().is_empty());
    }

    #[test]
    fn test_select_loads_messages_and_type() {
        let mut ws = workspace();
        let first = thread(&mut ws, "First");
        ws.new_session(ResearchType::KeywordResearch);
        ws.push_question("Second").unwrap();
        ws.push_reply(Message::assistant("r", "m", 1));

        assert!(ws.select(&first));
        assert_eq!(ws.research_type(), &ResearchType::MarketAnalysis);
        assert_eq!(ws.originating_prompt(), Some("First"));
    }

    #[test]
    fn test_attach_and_detach() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4").unwrap();

        let mut ws = workspace();
        let attached = ws.attach(&path).unwrap();
        assert_eq!(attached.name, "brief.pdf");
        assert_eq!(attached.size, 8);
        assert!(ws.detach("brief.pdf"));
        assert!(!ws.detach("brief.pdf"));
    }

    #[test]
    fn test_switching_threads_drops_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.csv");
        std::fs::write(&path, "a,b\n").unwrap();

        let mut ws = workspace();
        let first = thread(&mut ws, "First");
        let second = thread(&mut ws, "Second");
        ws.attach(&path).unwrap();
        assert!(ws.select(&first));
        assert!(ws.attachments().is_empty());

        assert!(ws.select(&second));
        ws.attach(&path).unwrap();
        ws.delete(&second).unwrap();
        assert_eq!(ws.active_id(), Some(first.as_str()));
        assert!(ws.attachments().is_empty());
    }

    #[test]
    fn test_type_fixed_after_thread_is_stored() {
        let mut ws = workspace();
        ws.set_type(ResearchType::KeywordResearch).unwrap();
        assert_eq!(ws.research_type(), &ResearchType::KeywordResearch);

        thread(&mut ws, "Stored");
        let err = ws.set_type(ResearchType::TrendAnalysis).unwrap_err();
        assert!(err.to_string().contains("fixed"));
        assert_eq!(ws.research_type(), &ResearchType::MarketAnalysis);
        assert_eq!(ws.history()[0].research_type, ResearchType::MarketAnalysis);

        ws.new_session(ResearchType::default());
        assert!(ws.set_type(ResearchType::TrendAnalysis).is_ok());
    }

    #[test]
    fn test_rating_parse() {
        assert_eq!(Rating::parse_str("UP"), Ok(Rating::Up));
        assert_eq!(Rating::parse_str("-"), Ok(Rating::Down));
        assert!(Rating::parse_str("meh").is_err());
    }
}
