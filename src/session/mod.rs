//! Session management
//!
//! A generic most-recent-first [`SessionStore`] with an active-session
//! pointer, instantiated twice: [`ContentWorkspace`] for generated drafts
//! with debounced auto-save, and [`ResearchWorkspace`] for chat threads
//! committed after every turn.

pub mod content;
pub mod research;
pub mod store;

pub use content::{ContentDraft, ContentSession, ContentWorkspace};
pub use research::{derive_title, Message, Rating, ResearchSession, ResearchWorkspace, Role};
pub use store::{
    new_session_id, ActiveChange, DeletePolicy, Deletion, SessionRecord, SessionStore, SortOrder,
};
