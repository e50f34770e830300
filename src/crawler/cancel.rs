//! Crawl cancellation
//!
//! A [`CancelToken`] is shared between the caller and the driver. Cancelling
//! it, or passing its deadline, stops the driver from dequeuing further URLs.
//! A page already being processed is finished.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Cloneable cancel signal with an optional deadline
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token that also fires once `limit` has elapsed from now
    ///
    /// A limit too large to represent means no deadline.
    pub fn with_deadline(mut self, limit: Duration) -> Self {
        self.deadline = Instant::now().checked_add(limit);
        self
    }

    /// Signals cancellation to every clone of this token
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Completes when the token is cancelled or its deadline passes
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline.into()) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}
