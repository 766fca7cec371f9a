//! Content generator workspace
//!
//! Holds the editable draft (body, prompt, type, settings), the content
//! session store, and the debouncer that commits the draft after a quiet
//! period.

use super::store::{
    new_session_id, ActiveChange, DeletePolicy, SessionRecord, SessionStore, SortOrder,
};
use crate::autosave::{is_committable, DebouncedTarget, Debouncer};
use crate::catalog::{ContentType, GenerationSettings};
use crate::error::{CopydeskError, Result};
use crate::generation::GenerationRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// A persisted generated-text editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSession {
    pub id: String,
    pub content: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub timestamp: DateTime<Utc>,
    pub settings: GenerationSettings,
}

impl ContentSession {
    /// Build a session stamped with the current time and the type's default settings
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        prompt: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        let settings = GenerationSettings::defaults_for(&content_type);
        Self {
            id: id.into(),
            content: content.into(),
            prompt: prompt.into(),
            content_type,
            timestamp: Utc::now(),
            settings,
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

impl SessionRecord for ContentSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.prompt
    }

    fn last_write(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn matches(&self, needle: &str) -> bool {
        self.prompt.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.content_type.label().to_lowercase().contains(needle)
    }
}

/// Editable working state of the content panel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentDraft {
    pub content: String,
    pub prompt: String,
    pub content_type: ContentType,
    pub settings: GenerationSettings,
}

impl ContentDraft {
    pub fn for_type(content_type: ContentType) -> Self {
        let settings = GenerationSettings::defaults_for(&content_type);
        Self::with_settings(content_type, settings)
    }

    /// Empty draft using `settings`, retargeted to `content_type`
    pub fn with_settings(content_type: ContentType, mut settings: GenerationSettings) -> Self {
        settings.retarget(&content_type);
        Self {
            content: String::new(),
            prompt: String::new(),
            content_type,
            settings,
        }
    }

    fn hydrate(&mut self, session: &ContentSession) {
        self.content = session.content.clone();
        self.prompt = session.prompt.clone();
        self.content_type = session.content_type.clone();
        self.settings = session.settings.clone();
    }
}

/// Content session manager
///
/// # Examples
///
/// ```
/// use copydesk::session::{ContentWorkspace, DeletePolicy};
/// use std::time::Duration;
/// use tokio::time::Instant;
///
/// let mut workspace = ContentWorkspace::new(Duration::from_millis(2000), DeletePolicy::KeepLast);
/// let start = Instant::now();
/// workspace.set_prompt("Write about coffee", start);
/// workspace.set_content("Coffee is great.", start);
/// assert!(workspace.tick(start + Duration::from_millis(2000)).is_some());
/// assert_eq!(workspace.history().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ContentWorkspace {
    store: SessionStore<ContentSession>,
    draft: ContentDraft,
    base_settings: GenerationSettings,
    autosave: Debouncer,
}

impl ContentWorkspace {
    pub fn new(quiet_period: Duration, policy: DeletePolicy) -> Self {
        Self {
            store: SessionStore::new(policy),
            draft: ContentDraft::default(),
            base_settings: GenerationSettings::default(),
            autosave: Debouncer::new(quiet_period),
        }
    }

    /// Use `content_type` and its defaults for the initial draft
    pub fn with_default_type(mut self, content_type: ContentType) -> Self {
        self.draft = ContentDraft::with_settings(content_type, self.base_settings.clone());
        self
    }

    /// Settings every fresh draft starts from (tone, language, ...)
    ///
    /// The word count is always retargeted to the draft's content type.
    pub fn with_base_settings(mut self, settings: GenerationSettings) -> Self {
        self.base_settings = settings;
        self.draft = ContentDraft::with_settings(
            self.draft.content_type.clone(),
            self.base_settings.clone(),
        );
        self
    }

    pub fn draft(&self) -> &ContentDraft {
        &self.draft
    }

    pub fn store(&self) -> &SessionStore<ContentSession> {
        &self.store
    }

    pub fn active_id(&self) -> Option<&str> {
        self.store.active_id()
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn quiet_period(&self) -> Duration {
        self.autosave.quiet_period()
    }

    /// Replace the draft body; schedules a debounced commit
    pub fn set_content(&mut self, content: impl Into<String>, now: Instant) {
        self.draft.content = content.into();
        self.autosave.touch(now);
    }

    /// Replace the draft prompt; schedules a debounced commit
    pub fn set_prompt(&mut self, prompt: impl Into<String>, now: Instant) {
        self.draft.prompt = prompt.into();
        self.autosave.touch(now);
    }

    /// Switch the draft's content type and reset type-dependent defaults
    pub fn set_type(&mut self, content_type: ContentType) {
        self.draft.settings.retarget(&content_type);
        self.draft.content_type = content_type;
    }

    /// Edit the draft's generation settings in place
    pub fn update_settings<F>(&mut self, f: F)
    where
        F: FnOnce(&mut GenerationSettings),
    {
        f(&mut self.draft.settings);
    }

    /// Commit the draft if its quiet period has elapsed at `now`
    pub fn tick(&mut self, now: Instant) -> Option<String> {
        if self.autosave.poll(now) {
            self.commit()
        } else {
            None
        }
    }

    /// Commit any pending edit immediately
    pub fn flush(&mut self) -> Option<String> {
        if self.autosave.cancel() {
            self.commit()
        } else {
            None
        }
    }

    /// Write the draft to the store
    ///
    /// Reuses the active id, or mints a new one that becomes active. Returns
    /// `None` without touching the store when the body or prompt is blank.
    pub fn commit(&mut self) -> Option<String> {
        if !is_committable(&self.draft.content, &self.draft.prompt) {
            debug!("Skipping content auto-save: body or prompt is blank");
            return None;
        }

        let id = self
            .store
            .active_id()
            .map(str::to_string)
            .unwrap_or_else(new_session_id);
        let session = ContentSession {
            id: id.clone(),
            content: self.draft.content.clone(),
            prompt: self.draft.prompt.clone(),
            content_type: self.draft.content_type.clone(),
            timestamp: Utc::now(),
            settings: self.draft.settings.clone(),
        };
        self.store.upsert(session);
        debug!(session_id = %id, "Committed content session");
        Some(id)
    }

    /// Make a stored session active and load it into the draft
    ///
    /// Pending edits of the previous session are committed first. Unknown
    /// ids are ignored and return `false`.
    pub fn select(&mut self, id: &str) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.flush();
        match self.store.select(id) {
            Some(session) => {
                self.draft.hydrate(session);
                info!(session_id = %id, "Selected content session");
                true
            }
            None => false,
        }
    }

    /// Delete a stored session
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::LastSession`] when only one session remains
    /// under the keep-last policy, and [`CopydeskError::Validation`] for an
    /// unknown id. Neither modifies the workspace.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let deleting_active = self.store.active_id() == Some(id);
        let deletion = self.store.delete(id)?.ok_or_else(|| {
            CopydeskError::Validation(format!("No content session with id {}", id))
        })?;

        if deleting_active {
            self.autosave.cancel();
        }
        match deletion.active {
            ActiveChange::Unchanged => {}
            ActiveChange::Reselected(next) => {
                if let Some(session) = self.store.get(&next) {
                    self.draft.hydrate(session);
                }
            }
            ActiveChange::Cleared => {
                self.draft.content.clear();
                self.draft.prompt.clear();
            }
        }
        info!(session_id = %id, remaining = self.store.len(), "Deleted content session");
        Ok(())
    }

    /// Start a fresh draft of `content_type`
    ///
    /// Pending edits are committed first. The new session is only stored on
    /// its first commit.
    pub fn new_session(&mut self, content_type: ContentType) {
        self.flush();
        self.store.clear_active();
        self.draft = ContentDraft::with_settings(content_type, self.base_settings.clone());
        info!(content_type = %self.draft.content_type, "Started new content session");
    }

    /// Build the generation request for the current draft
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::Validation`] when the prompt is blank.
    pub fn generation_request(&self) -> Result<GenerationRequest> {
        if self.draft.prompt.trim().is_empty() {
            return Err(CopydeskError::Validation("Please enter a prompt".to_string()).into());
        }
        Ok(GenerationRequest {
            content_type: self.draft.content_type.clone(),
            prompt: self.draft.prompt.clone(),
            settings: self.draft.settings.clone(),
        })
    }

    /// Load generated text into the draft and commit it right away
    pub fn apply_generated(&mut self, text: String) -> Option<String> {
        self.draft.content = text;
        self.autosave.cancel();
        self.commit()
    }

    /// History in the requested order
    pub fn history_sorted(&self, order: SortOrder) -> Vec<&ContentSession> {
        self.store.list(order)
    }

    /// History in store order
    pub fn history(&self) -> Vec<&ContentSession> {
        self.store.list(SortOrder::Recent)
    }

    pub fn search(&self, query: &str, order: SortOrder) -> Vec<&ContentSession> {
        self.store.search(query, order)
    }
}

impl DebouncedTarget for ContentWorkspace {
    fn fire(&mut self, now: Instant) -> Option<String> {
        self.tick(now)
    }
}
