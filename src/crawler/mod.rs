//! Crawler module for site traversal
//!
//! This module contains the core crawling logic, including:
//! - Scope and robots.txt admission
//! - Text and link extraction from rendered pages
//! - Document downloads into the artifact store
//! - Frontier management, pacing and cancellation
//! - Overall crawl coordination

mod cancel;
mod coordinator;
mod documents;
mod extractor;
mod frontier;
mod policy;

pub use cancel::CancelToken;
pub use coordinator::Coordinator;
pub use documents::{sanitize_display_text, DocumentFetcher, FetchOutcome};
pub use extractor::{DocumentLink, Extractor, PageResult};
pub use frontier::{Frontier, Pacer};
pub use policy::{Admission, PolicyGuard};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::render::{build_http_client, AnyRenderSession};
use crate::url::{extract_authority, normalize_url};
use crate::{CrawlError, UrlError};

/// Runs a complete crawl of the seed's site
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Normalize the seed and derive the session authority
/// 2. Build the HTTP client and load robots.txt (allow-all if unavailable)
/// 3. Open the configured render session
/// 4. Drive the frontier until it is empty, the page limit is hit, or
///    `cancel` fires
///
/// # Arguments
///
/// * `seed` - Absolute http(s) URL the crawl starts from
/// * `config` - The crawler configuration
/// * `cancel` - Cancellation signal, checked between pages
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl ran to completion (including after cancellation)
/// * `Err(CrawlError)` - The seed was invalid or the session could not start
///
/// # Example
///
/// ```no_run
/// use sitecrawl::{crawl, CancelToken, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = crawl("https://example.com/", &Config::default(), CancelToken::new()).await?;
/// println!("{} pages", report.pages_visited);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    seed: &str,
    config: &Config,
    cancel: CancelToken,
) -> Result<CrawlReport, CrawlError> {
    let seed = normalize_url(seed)?;
    let authority = extract_authority(&seed).ok_or(UrlError::MissingDomain)?;

    let client = build_http_client(&config.user_agent)?;
    let policy = PolicyGuard::load(
        &client,
        &seed,
        authority,
        config.user_agent.crawler_name.as_str(),
        config.crawler.timeout(),
    )
    .await;

    let session = AnyRenderSession::open(config, client.clone())
        .await
        .map_err(|e| {
            tracing::error!("{}", e);
            CrawlError::from(e)
        })?;

    let mut coordinator = Coordinator::new(config, seed, session, policy, client, cancel);
    coordinator.run().await
}
