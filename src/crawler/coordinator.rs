//! Crawl coordinator - the crawl driver loop
//!
//! The coordinator owns every component of one crawl session and runs the
//! frontier to exhaustion:
//! - Take the next unvisited URL and mark it visited
//! - Admit it through the policy guard (scope, robots.txt)
//! - Wait out the politeness delay, then render it
//! - Extract text and links, persist the page into the mirror
//! - Download linked documents
//! - Queue admitted navigable links that were not visited yet
//!
//! Per-page failures are contained: they are logged, counted in the report,
//! and the loop moves on.

use super::cancel::CancelToken;
use super::documents::DocumentFetcher;
use super::extractor::Extractor;
use super::frontier::{Frontier, Pacer};
use super::policy::{Admission, PolicyGuard};
use crate::config::Config;
use crate::output::{CrawlReport, SiteMirror};
use crate::render::RenderSession;
use crate::state::{CrawlPhase, PageState};
use crate::CrawlError;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator<R: RenderSession> {
    session: R,
    policy: PolicyGuard,
    extractor: Extractor,
    mirror: SiteMirror,
    documents: DocumentFetcher,
    frontier: Frontier,
    pacer: Pacer,
    phase: CrawlPhase,
    report: CrawlReport,
    cancel: CancelToken,
    timeout: Duration,
    max_pages: Option<usize>,
    rendered: usize,
}

impl<R: RenderSession> Coordinator<R> {
    /// Creates a coordinator in the `Idle` phase with only the seed queued
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `seed` - Normalized seed URL
    /// * `session` - Render session, released when the crawl ends
    /// * `policy` - Scope and robots.txt guard for the seed's authority
    /// * `client` - HTTP client used for document downloads
    /// * `cancel` - Stops the crawl between pages when triggered
    pub fn new(
        config: &Config,
        seed: Url,
        session: R,
        policy: PolicyGuard,
        client: Client,
        cancel: CancelToken,
    ) -> Self {
        let crawler = &config.crawler;

        let robots_delay = if crawler.respect_crawl_delay {
            policy.crawl_delay()
        } else {
            None
        };
        let delay = Pacer::effective_delay(crawler.delay(), robots_delay);
        if delay > crawler.delay() {
            tracing::info!("Using robots.txt crawl-delay of {:?}", delay);
        }

        let extractor = Extractor::new(
            policy.authority(),
            &crawler.document_extensions,
            crawler.extraction_strategy,
        );
        let documents = DocumentFetcher::new(
            client,
            &config.output.artifact_root,
            crawler.document_timeout(),
            config.output.document_naming,
            crawler.concurrent_downloads,
        );

        Self {
            session,
            policy,
            extractor,
            mirror: SiteMirror::new(&config.output.site_root),
            documents,
            report: CrawlReport::new(seed.as_str()),
            frontier: Frontier::with_seed(seed),
            pacer: Pacer::new(delay),
            phase: CrawlPhase::Idle,
            cancel,
            timeout: crawler.timeout(),
            max_pages: crawler.max_pages,
            rendered: 0,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs the crawl until the frontier is empty, the page limit is reached,
    /// or cancellation is signalled
    ///
    /// The render session is released exactly once before returning.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Counters for the finished crawl
    /// * `Err(CrawlError::InvalidTransition)` - The coordinator already ran
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlError> {
        self.transition(CrawlPhase::Running)?;
        tracing::info!(
            "Starting crawl of {} (delay {:?})",
            self.policy.authority(),
            self.pacer.delay()
        );

        let start_time = Instant::now();
        let mut cancelled = false;

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, stopping crawl");
                cancelled = true;
                break;
            }

            if let Some(limit) = self.max_pages {
                if self.rendered >= limit {
                    tracing::info!("Reached page limit of {}", limit);
                    break;
                }
            }

            let Some(url) = self.frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            let Some(state) = self.process_url(url).await else {
                cancelled = true;
                break;
            };
            self.report.record_page(state);

            if state.was_rendered() || state.is_error() {
                let attempted = self.rendered;
                if attempted % 10 == 0 {
                    let rate = attempted as f64 / start_time.elapsed().as_secs_f64();
                    tracing::info!(
                        "Progress: {} pages rendered, {} in frontier, {:.2} pages/sec",
                        attempted,
                        self.frontier.len(),
                        rate
                    );
                }
            }
        }

        self.transition(CrawlPhase::Draining)?;
        self.release().await?;

        self.report.finish(self.frontier.len(), cancelled);
        tracing::info!(
            "Crawl finished: {} pages rendered, {} documents saved in {:?}",
            self.report.pages_visited,
            self.report.documents_saved,
            start_time.elapsed()
        );

        Ok(self.report.clone())
    }

    /// Processes a single URL taken from the frontier
    ///
    /// Returns `None` if cancellation interrupted the politeness wait; the URL
    /// is put back on the frontier unrendered.
    async fn process_url(&mut self, url: Url) -> Option<PageState> {
        if !self.frontier.mark_visited(&url) {
            return Some(PageState::Rejected);
        }

        match self.policy.admit(&url) {
            Admission::Admitted => {}
            Admission::OutOfScope => {
                tracing::debug!("Skipping out-of-scope URL {}", url);
                return Some(PageState::Rejected);
            }
            Admission::Disallowed => {
                tracing::debug!("URL {} disallowed by robots.txt", url);
                return Some(PageState::Rejected);
            }
        }

        if !self.pacer.wait_turn(&self.cancel).await {
            self.frontier.requeue(url);
            return None;
        }

        self.rendered += 1;
        tracing::debug!("Rendering {}", url);

        let page = match self.session.load(&url, self.timeout).await {
            Ok(page) => page,
            Err(e) => {
                let error = CrawlError::from(e);
                tracing::warn!("{}", error);
                return Some(match error {
                    CrawlError::FetchTimeout { .. } => PageState::TimedOut,
                    _ => PageState::Failed,
                });
            }
        };

        let result = self.extractor.extract(&page);

        let state = match self.mirror.persist(&result).await {
            Ok(paths) => {
                tracing::debug!("Saved {} to {}", url, paths.content.display());
                if result.is_empty() {
                    PageState::Empty
                } else {
                    PageState::Processed
                }
            }
            Err(e) => {
                tracing::warn!("Could not save {}: {}", url, e);
                PageState::Unsaved
            }
        };

        if !result.document_links.is_empty() {
            for (link, outcome) in self.documents.fetch_all(&result.document_links).await {
                tracing::trace!("Document {} -> {:?}", link.url, outcome);
                self.report.record_document(&outcome);
            }
        }

        let mut queued = 0;
        for link in result.navigable_links {
            if self.frontier.is_visited(&link) || !self.policy.is_allowed(&link) {
                continue;
            }
            if self.frontier.push(link) {
                queued += 1;
            }
        }
        tracing::debug!("Queued {} new links from {}", queued, url);

        Some(state)
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Closes the render session and enters `Done`
    async fn release(&mut self) -> Result<(), CrawlError> {
        self.transition(CrawlPhase::Done)?;
        self.session.close().await;
        Ok(())
    }
}
