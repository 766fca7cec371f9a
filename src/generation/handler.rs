//! Generation request handler
//!
//! Gates submissions with a busy flag (`Idle → Generating → Idle`), runs the
//! generator under a cancellation token, and applies the result to the
//! workspace only on success.

use super::Generator;
use crate::error::{CopydeskError, Result};
use crate::notice::Notice;
use crate::session::{ContentWorkspace, Message, ResearchWorkspace};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Whether a request is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating,
}

/// Clears the busy flag when the request ends, however it ends
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Single-flight driver for a [`Generator`]
pub struct GenerationHandler {
    generator: Arc<dyn Generator>,
    busy: AtomicBool,
    current: Mutex<Option<CancellationToken>>,
}

impl GenerationHandler {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            busy: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub fn state(&self) -> GenerationState {
        if self.busy.load(Ordering::SeqCst) {
            GenerationState::Generating
        } else {
            GenerationState::Idle
        }
    }

    /// Abort the in-flight request, returning whether there was one
    pub fn cancel(&self) -> bool {
        let token = match self.current.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        match token {
            Some(token) if !token.is_cancelled() => {
                info!("Cancelling in-flight generation");
                token.cancel();
                true
            }
            _ => false,
        }
    }

    fn acquire(&self) -> Result<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CopydeskError::Busy)?;
        Ok(BusyGuard { flag: &self.busy })
    }

    fn install_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        match self.current.lock() {
            Ok(mut slot) => *slot = Some(token.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(token.clone()),
        }
        token
    }

    fn clear_token(&self) {
        match self.current.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let token = self.install_token();
        let outcome = tokio::select! {
            _ = token.cancelled() => Err(CopydeskError::Cancelled.into()),
            result = fut => result.map_err(|e| {
                if e.downcast_ref::<CopydeskError>().is_some() {
                    e
                } else {
                    CopydeskError::Generation(format!("{:#}", e)).into()
                }
            }),
        };
        self.clear_token();
        outcome
    }

    /// Generate text for the workspace draft and commit it
    ///
    /// # Errors
    ///
    /// Returns [`CopydeskError::Busy`] while another request is running,
    /// [`CopydeskError::Validation`] for a blank prompt,
    /// [`CopydeskError::Cancelled`] when aborted, and
    /// [`CopydeskError::Generation`] when the generator fails. The workspace
    /// is unchanged in every error case.
    pub async fn generate_content(&self, workspace: &mut ContentWorkspace) -> Result<Notice> {
        let _guard = self.acquire()?;
        let request = workspace.generation_request()?;
        info!(
            content_type = %request.content_type,
            generator = self.generator.name(),
            "Generating content"
        );

        let text = match self.run(self.generator.generate(&request)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Content generation failed");
                return Err(e);
            }
        };

        let words = text.split_whitespace().count();
        let session_id = workspace.apply_generated(text);
        debug!(?session_id, words, "Applied generated content");
        Ok(Notice::success("Content generated successfully!"))
    }

    /// Ask a research question and commit the updated thread
    ///
    /// The question is appended before the request and withdrawn again if it
    /// fails, so a failed turn leaves no trace.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GenerationHandler::generate_content`], with a
    /// blank question as the validation failure.
    pub async fn ask(&self, workspace: &mut ResearchWorkspace, question: &str) -> Result<Notice> {
        let _guard = self.acquire()?;
        let question_id = workspace.push_question(question)?.id.clone();
        let research_type = workspace.research_type().clone();
        info!(research_type = %research_type, generator = self.generator.name(), "Researching");

        match self
            .run(self.generator.research(&research_type, question.trim()))
            .await
        {
            Ok(reply) => {
                let message = Message::assistant(reply.content, reply.model, reply.token_estimate);
                let session_id = workspace.push_reply(message);
                debug!(?session_id, tokens = reply.token_estimate, "Committed research reply");
                Ok(Notice::success("Research complete"))
            }
            Err(e) => {
                warn!(error = %e, "Research request failed");
                workspace.retract_question(&question_id);
                Err(e)
            }
        }
    }
}
