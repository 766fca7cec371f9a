//! Debounced auto-save
//!
//! [`Debouncer`] is the clock-driven quiet-period tracker owned by a
//! workspace: each edit replaces the single pending deadline, and a commit is
//! due only once the deadline passes with no newer edit.
//!
//! [`AutoSaveTimer`] drives a debouncer in real time for interactive hosts.
//! It owns one spawned tokio task at most; rescheduling aborts the previous
//! task before spawning the next.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Quiet period used when none is configured
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(2000);

/// Whether a draft is eligible for commit
///
/// Both the text body and the prompt must contain non-whitespace characters.
///
/// # Examples
///
/// ```
/// use copydesk::autosave::is_committable;
///
/// assert!(is_committable("Some copy", "Write about coffee"));
/// assert!(!is_committable("   ", "Write about coffee"));
/// assert!(!is_committable("Some copy", "\n\t"));
/// ```
pub fn is_committable(body: &str, prompt: &str) -> bool {
    !body.trim().is_empty() && !prompt.trim().is_empty()
}

/// Single-slot quiet-period tracker
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Record an edit at `now`, replacing any pending deadline
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet_period);
    }

    /// Consume the pending deadline if it has elapsed at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending deadline, returning whether one existed
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

/// A workspace whose debounced commit can be fired by a timer
pub trait DebouncedTarget: Send + 'static {
    /// Commit if the quiet period has elapsed at `now`; returns the committed id
    fn fire(&mut self, now: Instant) -> Option<String>;
}

/// Real-time driver for a [`DebouncedTarget`]
///
/// Holds at most one pending timer task. Dropping the timer aborts it.
#[derive(Debug, Default)]
pub struct AutoSaveTimer {
    slot: Option<JoinHandle<Option<String>>>,
}

impl AutoSaveTimer {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Cancel the pending task and schedule a new one after `delay`
    ///
    /// Must be called from within a tokio runtime.
    pub fn reschedule<T: DebouncedTarget>(&mut self, target: Arc<Mutex<T>>, delay: Duration) {
        self.cancel();
        self.slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let committed = target.lock().await.fire(Instant::now());
            if let Some(id) = &committed {
                debug!(session_id = %id, "Auto-save timer committed session");
            }
            committed
        }));
    }

    /// Abort the pending task, returning whether one was still running
    pub fn cancel(&mut self) -> bool {
        match self.slot.take() {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.abort();
                running
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.slot.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the pending task and return what it committed
    pub async fn settle(&mut self) -> Option<String> {
        let handle = self.slot.take()?;
        handle.await.ok().flatten()
    }
}

impl Drop for AutoSaveTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
