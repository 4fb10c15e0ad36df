//! Submission state and request tokens for weather lookups.
//!
//! Every submission is issued a token. Results carrying a token that is no
//! longer the latest are dropped, so a slow superseded lookup cannot
//! overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one lookup cycle. Later submissions get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues monotonically increasing tokens. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RequestTokens {
    latest: Arc<AtomicU64>,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for a new submission, superseding all earlier ones.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Most recently issued token, without issuing a new one. Before the
    /// first submission this is token `#0`.
    pub fn latest(&self) -> RequestToken {
        RequestToken(self.latest.load(Ordering::SeqCst))
    }

    /// True if no submission has been issued after `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Controller state: idle until a submission starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting(RequestToken),
}

impl SubmissionState {
    pub fn is_idle(self) -> bool {
        matches!(self, SubmissionState::Idle)
    }

    /// State after a submission with `token` starts. Submissions are never
    /// blocked; a newer one simply replaces the tracked token.
    pub fn on_submit(self, token: RequestToken) -> Self {
        SubmissionState::Submitting(token)
    }

    /// State after the lookup for `token` finishes. An older lookup
    /// finishing does not end a newer submission.
    pub fn on_finished(self, token: RequestToken) -> Self {
        match self {
            SubmissionState::Submitting(active) if active == token => SubmissionState::Idle,
            other => other,
        }
    }
}
