//! Frontier and request pacing
//!
//! The frontier holds URLs waiting to be rendered plus the set of URLs already
//! taken. A URL enters the visited set at most once, so no page is rendered
//! twice in a session. Dequeue order is FIFO, which keeps crawls of the same
//! site reproducible.

use super::cancel::CancelToken;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use url::Url;

/// Pending and visited URL sets for one crawl session
#[derive(Debug, Default)]
pub struct Frontier {
    pending: VecDeque<Url>,
    queued: HashSet<Url>,
    visited: HashSet<Url>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn with_seed(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed);
        frontier
    }

    /// Queues a URL unless it is already pending or visited
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: Url) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Takes the next URL that has not been visited yet
    ///
    /// Visited entries encountered on the way are discarded.
    pub fn pop(&mut self) -> Option<Url> {
        while let Some(url) = self.pending.pop_front() {
            self.queued.remove(&url);
            if !self.visited.contains(&url) {
                return Some(url);
            }
            tracing::trace!("Discarding already visited {}", url);
        }
        None
    }

    /// Records a URL as visited
    ///
    /// Returns false if it had already been visited.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.clone())
    }

    /// Returns a URL to the front of the queue and forgets its visit
    ///
    /// Used when cancellation interrupts a URL before it was rendered.
    pub fn requeue(&mut self, url: Url) {
        self.visited.remove(&url);
        if self.queued.insert(url.clone()) {
            self.pending.push_front(url);
        }
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs still waiting
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Enforces the minimum gap between consecutive page renders
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last_request: Option<Instant>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: None,
        }
    }

    /// Effective delay: the configured one, raised to robots.txt crawl-delay
    pub fn effective_delay(configured: Duration, crawl_delay: Option<Duration>) -> Duration {
        crawl_delay.map_or(configured, |robots| configured.max(robots))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time left before the next render may start
    pub fn time_until_ready(&self, now: Instant) -> Duration {
        match self.last_request {
            Some(last) => (last + self.delay).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Waits for this request's turn and records it as started
    ///
    /// Returns false, without recording, if cancellation arrives first.
    pub async fn wait_turn(&mut self, cancel: &CancelToken) -> bool {
        let wait = self.time_until_ready(Instant::now());
        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before next request", wait);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = cancel.cancelled() => return false,
            }
        }

        if cancel.is_cancelled() {
            return false;
        }
        self.last_request = Some(Instant::now());
        true
    }
}
