//! Policy guard: crawl scope and robots.txt admission
//!
//! A URL is admitted only if it shares the seed's authority and robots.txt
//! permits the crawler to fetch it. Rejection is silent: the URL is dropped,
//! never retried.

use crate::config::MAX_DELAY_SECONDS;
use crate::robots::{load_robots_or_allow, ParsedRobots};
use crate::url::same_authority;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Result of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    OutOfScope,
    Disallowed,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Scope and robots.txt checks for one crawl session
///
/// The robots policy is loaded once and shared read-only; cloning the guard
/// is cheap.
#[derive(Debug, Clone)]
pub struct PolicyGuard {
    authority: String,
    agent: String,
    robots: Arc<ParsedRobots>,
}

impl PolicyGuard {
    /// Creates a guard from an already loaded robots policy
    ///
    /// # Arguments
    ///
    /// * `authority` - The session's authority (`host` or `host:port`)
    /// * `agent` - The product token matched against robots.txt groups
    /// * `robots` - The parsed robots policy
    pub fn new(authority: impl Into<String>, agent: impl Into<String>, robots: ParsedRobots) -> Self {
        Self {
            authority: authority.into(),
            agent: agent.into(),
            robots: Arc::new(robots),
        }
    }

    /// Loads robots.txt for the seed's site and builds the guard
    ///
    /// An unavailable robots.txt yields an allow-all policy.
    pub async fn load(
        client: &Client,
        seed: &Url,
        authority: impl Into<String>,
        agent: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let robots = load_robots_or_allow(client, seed, timeout).await;
        Self::new(authority, agent, robots)
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// True iff the URL's authority equals the session authority
    pub fn is_in_scope(&self, url: &Url) -> bool {
        same_authority(url, &self.authority)
    }

    /// True iff robots.txt permits the configured agent to fetch the URL
    pub fn is_allowed(&self, url: &Url) -> bool {
        self.robots.is_allowed(url.as_str(), &self.agent)
    }

    /// Combined scope and robots check
    pub fn admit(&self, url: &Url) -> Admission {
        if !self.is_in_scope(url) {
            Admission::OutOfScope
        } else if !self.is_allowed(url) {
            Admission::Disallowed
        } else {
            Admission::Admitted
        }
    }

    /// Crawl-delay requested by robots.txt for this agent
    ///
    /// Negative, NaN, or values above `MAX_DELAY_SECONDS` are ignored with a
    /// warning; the configured delay then applies alone.
    pub fn crawl_delay(&self) -> Option<Duration> {
        let secs = self.robots.crawl_delay(&self.agent)?;
        if !(0.0..=MAX_DELAY_SECONDS).contains(&secs) {
            tracing::warn!("Ignoring out-of-range robots.txt crawl-delay of {}", secs);
            return None;
        }
        Duration::try_from_secs_f64(secs).ok()
    }
}
