//! Crawl report
//!
//! Counters collected by the driver while it runs, and a printer for the CLI.

use crate::crawler::FetchOutcome;
use crate::state::PageState;
use chrono::{DateTime, Utc};

/// Summary of one crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Seed URL the crawl started from
    pub seed: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages rendered (successfully or not persisted)
    pub pages_visited: u64,

    /// Pages whose render failed or timed out
    pub pages_failed: u64,

    /// Of `pages_failed`, those that timed out
    pub pages_timed_out: u64,

    /// Rendered pages with no visible text
    pub pages_empty: u64,

    /// Rendered pages whose mirror files could not be written
    pub pages_unsaved: u64,

    /// URLs dropped at admission (out of scope or disallowed)
    pub pages_rejected: u64,

    pub documents_saved: u64,
    pub documents_skipped: u64,
    pub documents_failed: u64,

    /// URLs still queued when the crawl stopped
    pub frontier_remaining: u64,

    /// True if the crawl stopped on a cancel signal or deadline
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            started_at: Utc::now(),
            finished_at: None,
            pages_visited: 0,
            pages_failed: 0,
            pages_timed_out: 0,
            pages_empty: 0,
            pages_unsaved: 0,
            pages_rejected: 0,
            documents_saved: 0,
            documents_skipped: 0,
            documents_failed: 0,
            frontier_remaining: 0,
            cancelled: false,
        }
    }

    /// Records the final state of one frontier entry
    pub fn record_page(&mut self, state: PageState) {
        if state.was_rendered() {
            self.pages_visited += 1;
        }
        match state {
            PageState::Processed => {}
            PageState::Empty => self.pages_empty += 1,
            PageState::Unsaved => self.pages_unsaved += 1,
            PageState::Rejected => self.pages_rejected += 1,
            PageState::TimedOut => {
                self.pages_failed += 1;
                self.pages_timed_out += 1;
            }
            PageState::Failed => self.pages_failed += 1,
        }
    }

    /// Records one document outcome
    pub fn record_document(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Saved { .. } => self.documents_saved += 1,
            FetchOutcome::Skipped { .. } => self.documents_skipped += 1,
            FetchOutcome::Failed { .. } => self.documents_failed += 1,
        }
    }

    /// Marks the report finished
    pub fn finish(&mut self, frontier_remaining: usize, cancelled: bool) {
        self.finished_at = Some(Utc::now());
        self.frontier_remaining = frontier_remaining as u64;
        self.cancelled = cancelled;
    }

    /// Wall-clock duration, if finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    /// Share of attempted renders that succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_visited + self.pages_failed;
        if attempted == 0 {
            return 0.0;
        }
        ((self.pages_visited - self.pages_unsaved) as f64 / attempted as f64) * 100.0
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Seed: {}", report.seed);
    println!("Started: {}", report.started_at.to_rfc3339());
    if let Some(finished) = report.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = report.duration() {
        println!("Duration: {}s", duration.num_seconds());
    }
    if report.cancelled {
        println!(
            "Stopped early: {} URLs left in the frontier",
            report.frontier_remaining
        );
    }
    println!();

    println!("Pages:");
    println!("  Visited: {}", report.pages_visited);
    println!(
        "  Failed: {} ({} timed out)",
        report.pages_failed, report.pages_timed_out
    );
    println!("  Empty: {}", report.pages_empty);
    println!("  Unsaved: {}", report.pages_unsaved);
    println!("  Rejected: {}", report.pages_rejected);
    println!();

    println!("Documents:");
    println!("  Saved: {}", report.documents_saved);
    println!("  Skipped: {}", report.documents_skipped);
    println!("  Failed: {}", report.documents_failed);
    println!();

    println!("Success Rate: {:.1}%", report.success_rate());
}
