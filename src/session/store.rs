//! Generic session store with an active-session pointer
//!
//! The store keeps sessions most-recent-first and tracks at most one active
//! session. It is shared by the content and research workspaces, which
//! differ only in their session payload.

use crate::error::{CopydeskError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Behavior every stored session payload provides to the store
pub trait SessionRecord: Clone {
    /// Stable identity of the session
    fn id(&self) -> &str;

    /// Short display title used for listing and title sorting
    fn title(&self) -> &str;

    /// Time of the last write
    fn last_write(&self) -> DateTime<Utc>;

    /// Whether the session matches a lowercase search needle
    fn matches(&self, needle: &str) -> bool;
}

/// Whether the store may become empty through deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Refuse to delete the only remaining session
    #[default]
    KeepLast,
    /// Allow the store to become empty
    AllowEmpty,
}

impl DeletePolicy {
    pub fn from_allow_delete_last(allow: bool) -> Self {
        if allow {
            Self::AllowEmpty
        } else {
            Self::KeepLast
        }
    }
}

/// Ordering for history listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Store order: most recently created first
    #[default]
    Recent,
    /// Reverse store order
    Oldest,
    /// Case-insensitive alphabetical by title
    Title,
}

impl SortOrder {
    /// Parse a sort name ("recent", "oldest", "title")
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "recent" | "newest" => Ok(Self::Recent),
            "oldest" => Ok(Self::Oldest),
            "title" | "alpha" | "alphabetical" => Ok(Self::Title),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// How the active pointer changed as a result of a deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveChange {
    /// The deleted session was not the active one
    Unchanged,
    /// The active session was deleted and this id took its place
    Reselected(String),
    /// The active session was deleted and nothing remains
    Cleared,
}

/// Result of a successful deletion
#[derive(Debug, Clone)]
pub struct Deletion<S> {
    pub removed: S,
    pub active: ActiveChange,
}

/// Ordered session collection plus the active pointer
///
/// # Examples
///
/// ```
/// use copydesk::session::{ContentSession, DeletePolicy, SessionStore};
///
/// let mut store = SessionStore::new(DeletePolicy::KeepLast);
/// store.upsert(ContentSession::new("a", "Draft", "Write about coffee", Default::default()));
/// assert_eq!(store.active_id(), Some("a"));
/// assert!(store.delete("a").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    sessions: Vec<S>,
    active: Option<String>,
    policy: DeletePolicy,
}

impl<S: SessionRecord> SessionStore<S> {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            sessions: Vec::new(),
            active: None,
            policy,
        }
    }

    /// Insert or replace a session and mark it active
    ///
    /// An existing id is replaced in place, keeping its position. A new id is
    /// prepended.
    pub fn upsert(&mut self, session: S) -> &S {
        let id = session.id().to_string();
        let index = match self.position(&id) {
            Some(index) => {
                self.sessions[index] = session;
                debug!(session_id = %id, "Replaced session in place");
                index
            }
            None => {
                self.sessions.insert(0, session);
                debug!(session_id = %id, "Inserted new session");
                0
            }
        };
        self.active = Some(id);
        &self.sessions[index]
    }

    /// Mark a session active and return its snapshot
    ///
    /// Unknown ids leave the store untouched and return `None`.
    pub fn select(&mut self, id: &str) -> Option<&S> {
        let index = self.position(id)?;
        self.active = Some(id.to_string());
        Some(&self.sessions[index])
    }

    /// Delete a session
    ///
    /// Returns `Ok(None)` when the id is not in the store.
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::LastSession`] when the store holds a single
    /// session and the policy is [`DeletePolicy::KeepLast`]. The store is not
    /// modified in that case.
    pub fn delete(&mut self, id: &str) -> Result<Option<Deletion<S>>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        if self.policy == DeletePolicy::KeepLast && self.sessions.len() == 1 {
            return Err(CopydeskError::LastSession.into());
        }
        let removed = self.sessions.remove(index);

        let active = if self.active.as_deref() == Some(id) {
            match self.sessions.first() {
                Some(next) => {
                    let next_id = next.id().to_string();
                    self.active = Some(next_id.clone());
                    ActiveChange::Reselected(next_id)
                }
                None => {
                    self.active = None;
                    ActiveChange::Cleared
                }
            }
        } else {
            ActiveChange::Unchanged
        };

        debug!(session_id = %id, ?active, remaining = self.sessions.len(), "Deleted session");
        Ok(Some(Deletion { removed, active }))
    }

    /// Clear the active pointer without touching stored sessions
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Modify a stored session in place without changing its position
    pub fn update<F>(&mut self, id: &str, f: F) -> Option<&S>
    where
        F: FnOnce(&mut S),
    {
        let index = self.position(id)?;
        f(&mut self.sessions[index]);
        Some(&self.sessions[index])
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&S> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&S> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve(&self, id_or_prefix: &str) -> Option<&str> {
        if let Some(session) = self.get(id_or_prefix) {
            return Some(session.id());
        }
        let needle = id_or_prefix.to_uppercase();
        let mut matches = self
            .sessions
            .iter()
            .filter(|s| s.id().to_uppercase().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only.id()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    /// Sessions in store order
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.sessions.iter()
    }

    /// Sessions in the requested order
    pub fn list(&self, order: SortOrder) -> Vec<&S> {
        let mut sessions: Vec<&S> = self.sessions.iter().collect();
        match order {
            SortOrder::Recent => {}
            SortOrder::Oldest => sessions.reverse(),
            SortOrder::Title => {
                sessions.sort_by_key(|s| s.title().to_lowercase());
            }
        }
        sessions
    }

    /// Sessions matching a case-insensitive query, in the requested order
    ///
    /// A blank query matches everything.
    pub fn search(&self, query: &str, order: SortOrder) -> Vec<&S> {
        let needle = query.trim().to_lowercase();
        self.list(order)
            .into_iter()
            .filter(|s| needle.is_empty() || s.matches(&needle))
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id() == id)
    }
}

/// Generate a new time-ordered session id
///
/// # Examples
///
/// ```
/// use copydesk::session::new_session_id;
///
/// let a = new_session_id();
/// let b = new_session_id();
/// assert_ne!(a, b);
/// assert_eq!(a.len(), 26);
/// ```
pub fn new_session_id() -> String {
    ulid::Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: String,
        body: String,
        at: DateTime<Utc>,
    }

    impl Note {
        fn new(id: &str, body: &str) -> Self {
            Self {
                id: id.to_string(),
                body: body.to_string(),
                at: Utc::now(),
            }
        }
    }

    impl SessionRecord for Note {
        fn id(&self) -> &str {
            &self.id
        }

        fn title(&self) -> &str {
            &self.body
        }

        fn last_write(&self) -> DateTime<Utc> {
            self.at
        }

        fn matches(&self, needle: &str) -> bool {
            self.body.to_lowercase().contains(needle)
        }
    }

    fn ids(store: &SessionStore<Note>) -> Vec<&str> {
        store.iter().map(|n| n.id()).collect()
    }

    #[test]
    fn test_upsert_prepends_new_sessions() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("a", "first"));
        store.upsert(Note::new("b", "second"));
        assert_eq!(ids(&store), vec!["b", "a"]);
        assert_eq!(store.active_id(), Some("b"));
    }

    #[test]
    fn test_upsert_same_id_overwrites_in_place() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        for i in 0..5 {
            store.upsert(Note::new("fixed", &format!("rev {}", i)));
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().unwrap().body, "rev 4");
        assert_eq!(store.active_id(), Some("fixed"));
    }

    #[test]
    fn test_upsert_existing_keeps_position() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("a", "a1"));
        store.upsert(Note::new("b", "b1"));
        store.upsert(Note::new("a", "a2"));
        assert_eq!(ids(&store), vec!["b", "a"]);
        assert_eq!(store.get("a").unwrap().body, "a2");
        assert_eq!(store.active_id(), Some("a"));
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("a", "a"));
        assert!(store.select("missing").is_none());
        assert_eq!(store.active_id(), Some("a"));
    }

    #[test]
    fn test_select_marks_active() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("a", "alpha"));
        store.upsert(Note::new("b", "beta"));
        let selected = store.select("a").unwrap();
        assert_eq!(selected.body, "alpha");
        assert_eq!(store.active_id(), Some("a"));
    }

    #[test]
    fn test_delete_last_session_is_rejected() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("only", "x"));
        let err = store.delete("only").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CopydeskError>(),
            Some(CopydeskError::LastSession)
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), Some("only"));
    }

    #[test]
    fn test_delete_active_reselects_front() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("a", "a"));
        store.upsert(Note::new("b", "b"));
        store.upsert(Note::new("c", "c"));
        store.select("b");

        let deletion = store.delete("b").unwrap().unwrap();
        assert_eq!(deletion.removed.id, "b");
        assert_eq!(deletion.active, ActiveChange::Reselected("c".to_string()));
        assert_eq!(store.active_id(), Some("c"));
        assert_eq!(ids(&store), vec!["c", "a"]);
    }

    #[test]
    fn test_delete_non_active_keeps_pointer() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("a", "a"));
        store.upsert(Note::new("b", "b"));

        let deletion = store.delete("a").unwrap().unwrap();
        assert_eq!(deletion.active, ActiveChange::Unchanged);
        assert_eq!(store.active_id(), Some("b"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_unknown_id_returns_none() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("a", "a"));
        store.upsert(Note::new("b", "b"));
        assert!(store.delete("zzz").unwrap().is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_unknown_id_from_single_session_store() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        assert!(store.delete("ghost").unwrap().is_none());

        store.upsert(Note::new("only", "x"));
        assert!(store.delete("ghost").unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_allow_empty_policy_clears_active() {
        let mut store = SessionStore::new(DeletePolicy::AllowEmpty);
        store.upsert(Note::new("only", "x"));
        let deletion = store.delete("only").unwrap().unwrap();
        assert_eq!(deletion.active, ActiveChange::Cleared);
        assert!(store.is_empty());
        assert!(store.active_id().is_none());
    }

    #[test]
    fn test_list_orders() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("1", "banana"));
        store.upsert(Note::new("2", "Apple"));
        store.upsert(Note::new("3", "cherry"));

        let recent: Vec<_> = store.list(SortOrder::Recent).iter().map(|n| n.id()).collect();
        assert_eq!(recent, vec!["3", "2", "1"]);
        let oldest: Vec<_> = store.list(SortOrder::Oldest).iter().map(|n| n.id()).collect();
        assert_eq!(oldest, vec!["1", "2", "3"]);
        let title: Vec<_> = store.list(SortOrder::Title).iter().map(|n| n.id()).collect();
        assert_eq!(title, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("1", "Cold brew guide"));
        store.upsert(Note::new("2", "Tea ceremony"));
        let hits = store.search("BREW", SortOrder::Recent);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), "1");
        assert_eq!(store.search("  ", SortOrder::Recent).len(), 2);
    }

    #[test]
    fn test_resolve_prefix() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("01ABCDEF", "x"));
        store.upsert(Note::new("01ABXYZ0", "y"));
        assert_eq!(store.resolve("01abc"), Some("01ABCDEF"));
        assert_eq!(store.resolve("01AB"), None);
        assert_eq!(store.resolve("01ABXYZ0"), Some("01ABXYZ0"));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut store = SessionStore::new(DeletePolicy::KeepLast);
        store.upsert(Note::new("a", "a"));
        store.upsert(Note::new("b", "b"));
        store.update("a", |n| n.body = "changed".to_string());
        assert_eq!(ids(&store), vec!["b", "a"]);
        assert_eq!(store.get("a").unwrap().body, "changed");
        assert_eq!(store.active_id(), Some("b"));
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse_str("Oldest"), Ok(SortOrder::Oldest));
        assert!(SortOrder::parse_str("random").is_err());
    }
}
