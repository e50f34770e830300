//! Document fetcher
//!
//! Downloads document links into the artifact store at
//! `<artifact_root>/<type>/<sanitized text>.<type>`. An existing destination
//! file is never downloaded again, across pages and across crawl runs.
//! Downloads for one page run on a small bounded worker pool.

use crate::config::DocumentNaming;
use crate::crawler::extractor::DocumentLink;
use crate::output::write_atomic;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Name used when the anchor text sanitizes to nothing
const FALLBACK_NAME: &str = "document";

/// Result of handling one document link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Downloaded and written to `path`
    Saved { path: PathBuf },

    /// `path` already existed; no request was made
    Skipped { path: PathBuf },

    /// Request, status or write failure
    Failed { url: String, reason: String },
}

/// Downloads documents into the artifact store
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: Client,
    artifact_root: PathBuf,
    timeout: Duration,
    naming: DocumentNaming,
    workers: Arc<Semaphore>,
}

impl DocumentFetcher {
    pub fn new(
        client: Client,
        artifact_root: impl Into<PathBuf>,
        timeout: Duration,
        naming: DocumentNaming,
        concurrent_downloads: usize,
    ) -> Self {
        Self {
            client,
            artifact_root: artifact_root.into(),
            timeout,
            naming,
            workers: Arc::new(Semaphore::new(concurrent_downloads.max(1))),
        }
    }

    /// Destination path for a document link
    ///
    /// A pure function of the link, so repeated crawls agree on it.
    pub fn destination(&self, link: &DocumentLink) -> PathBuf {
        let mut name = sanitize_display_text(&link.text);
        if name.is_empty() {
            name = FALLBACK_NAME.to_string();
        }
        if self.naming == DocumentNaming::DisplayTextWithHash {
            name = format!("{}-{}", name, short_url_hash(&link.url));
        }

        self.artifact_root
            .join(&link.file_type)
            .join(format!("{}.{}", name, link.file_type))
    }

    /// Downloads one document unless its destination already exists
    pub async fn fetch(&self, link: &DocumentLink) -> FetchOutcome {
        let path = self.destination(link);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("Document already stored: {}", path.display());
            return FetchOutcome::Skipped { path };
        }

        match self.download(&link.url, &path).await {
            Ok(bytes) => {
                tracing::info!("Saved document {} ({} bytes)", path.display(), bytes);
                FetchOutcome::Saved { path }
            }
            Err(reason) => {
                tracing::warn!("Failed to download {}: {}", link.url, reason);
                FetchOutcome::Failed {
                    url: link.url.clone(),
                    reason,
                }
            }
        }
    }

    /// Downloads a page's documents on the worker pool
    ///
    /// Links sharing a destination are collapsed first: only the first is
    /// fetched, later ones are reported as skipped. Outcomes come back in
    /// input order.
    pub async fn fetch_all(&self, links: &[DocumentLink]) -> Vec<(DocumentLink, FetchOutcome)> {
        let mut outcomes: Vec<Option<FetchOutcome>> = vec![None; links.len()];
        let mut claimed = HashSet::new();
        let mut tasks = JoinSet::new();

        for (index, link) in links.iter().enumerate() {
            let path = self.destination(link);
            if !claimed.insert(path.clone()) {
                tracing::debug!(
                    "{} shares destination {} with an earlier link",
                    link.url,
                    path.display()
                );
                outcomes[index] = Some(FetchOutcome::Skipped { path });
                continue;
            }

            let fetcher = self.clone();
            let link = link.clone();
            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = fetcher.workers.clone().acquire_owned().await.ok();
                (index, fetcher.fetch(&link).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => tracing::error!("Document download task failed: {}", e),
            }
        }

        links
            .iter()
            .cloned()
            .zip(outcomes)
            .map(|(link, outcome)| {
                let outcome = outcome.unwrap_or_else(|| FetchOutcome::Failed {
                    url: link.url.clone(),
                    reason: "download task aborted".to_string(),
                });
                (link, outcome)
            })
            .collect()
    }

    async fn download(&self, url: &str, path: &Path) -> Result<usize, String> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        write_atomic(path, &bytes)
            .await
            .map_err(|e| format!("write {}: {}", path.display(), e))?;
        Ok(bytes.len())
    }
}

/// Keeps alphanumerics, spaces, hyphens and underscores; strips trailing whitespace
///
/// # Examples
///
/// ```
/// use sitecrawl::crawler::sanitize_display_text;
///
/// assert_eq!(sanitize_display_text("Q1 Report!"), "Q1 Report");
/// assert_eq!(sanitize_display_text("Q1 Report?"), "Q1 Report");
/// assert_eq!(sanitize_display_text("Tilasto 2023 / ä"), "Tilasto 2023  ä");
/// ```
pub fn sanitize_display_text(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().to_string()
}

fn short_url_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..4])
}
