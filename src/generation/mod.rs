//! Text generation capability
//!
//! The session workspaces never produce text themselves. They hand a
//! [`GenerationRequest`] to a [`Generator`], which may be the built-in
//! [`TemplateGenerator`] or any other backend implementing the trait.

pub mod handler;
pub mod template;

pub use handler::{GenerationHandler, GenerationState};
pub use template::TemplateGenerator;

use crate::catalog::{ContentType, GenerationSettings, ResearchType};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything a generator needs to produce one content draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub content_type: ContentType,
    pub prompt: String,
    pub settings: GenerationSettings,
}

/// Answer to a research question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchReply {
    pub content: String,
    /// Label of the model that produced the reply
    pub model: String,
    pub token_estimate: u32,
}

impl ResearchReply {
    /// Build a reply, estimating its token count from the content
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        let content = content.into();
        let token_estimate = estimate_tokens(&content);
        Self {
            content,
            model: model.into(),
            token_estimate,
        }
    }
}

/// Asynchronous, fallible text generation backend
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use copydesk::catalog::ResearchType;
/// use copydesk::error::Result;
/// use copydesk::generation::{GenerationRequest, Generator, ResearchReply};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Generator for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn generate(&self, request: &GenerationRequest) -> Result<String> {
///         Ok(request.prompt.clone())
///     }
///
///     async fn research(&self, _research_type: &ResearchType, query: &str) -> Result<ResearchReply> {
///         Ok(ResearchReply::new(query, self.name()))
///     }
/// }
/// ```
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model label reported with research replies
    fn name(&self) -> &str;

    /// Produce a content draft for `request`
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails; callers surface it and leave
    /// stored sessions untouched.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Answer `query` in the context of `research_type`
    async fn research(&self, research_type: &ResearchType, query: &str) -> Result<ResearchReply>;
}

/// Rough token count: four characters per token, rounded up
///
/// # Examples
///
/// ```
/// use copydesk::generation::estimate_tokens;
///
/// assert_eq!(estimate_tokens(""), 0);
/// assert_eq!(estimate_tokens("abcd"), 1);
/// assert_eq!(estimate_tokens("abcde"), 2);
/// ```
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count();
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}
