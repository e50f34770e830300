//! Robots.txt handling module
//!
//! This module fetches and parses the site's robots.txt once per crawl.
//! Fetch failures never block a crawl: the caller falls back to an
//! allow-all policy.

mod parser;

pub use parser::ParsedRobots;

use crate::CrawlError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Returns the robots.txt location for the site `url` belongs to
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::robots::robots_url;
///
/// let url = Url::parse("https://example.com:8443/a/b?q=1").unwrap();
/// assert_eq!(robots_url(&url).unwrap().as_str(), "https://example.com:8443/robots.txt");
/// ```
pub fn robots_url(url: &Url) -> Result<Url, CrawlError> {
    Ok(url.join("/robots.txt")?)
}

/// Fetches and parses robots.txt for the site `url` belongs to
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - robots.txt was served with a success status
/// * `Err(CrawlError::PolicyLoadFailed)` - transport error or non-success status
pub async fn fetch_robots(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<ParsedRobots, CrawlError> {
    let location = robots_url(url)?;
    tracing::debug!("Fetching robots.txt from {}", location);

    let response = client
        .get(location.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| CrawlError::PolicyLoadFailed(format!("{}: {}", location, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::PolicyLoadFailed(format!(
            "{} returned HTTP {}",
            location,
            status.as_u16()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| CrawlError::PolicyLoadFailed(format!("{}: {}", location, e)))?;

    Ok(ParsedRobots::from_content(&body))
}

/// Fetches robots.txt, falling back to allow-all on any failure
///
/// The failure is logged, never escalated.
pub async fn load_robots_or_allow(client: &Client, url: &Url, timeout: Duration) -> ParsedRobots {
    match fetch_robots(client, url, timeout).await {
        Ok(robots) => robots,
        Err(e) => {
            tracing::warn!("{}; continuing with an allow-all policy", e);
            ParsedRobots::allow_all()
        }
    }
}
