//! Render session module
//!
//! A render session loads one URL at a time and hands back the rendered HTML.
//! One session is opened per crawl and reused for every page load, so loads
//! are strictly sequential against it.
//!
//! Two backends exist:
//! - [`HttpRenderSession`]: fetches the served HTML over HTTP (default)
//! - `BrowserRenderSession`: drives headless Chromium (`browser` feature)

pub mod consent;
mod http;

#[cfg(feature = "browser")]
mod browser;

pub use http::{build_http_client, HttpRenderSession, MAX_PAGE_BYTES};

#[cfg(feature = "browser")]
pub use browser::BrowserRenderSession;

use crate::config::{Config, RenderBackend};
use crate::url::extract_authority;
use crate::CrawlError;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A page as rendered by a [`RenderSession`]
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The URL that was requested (the page's identity in the mirror)
    pub url: Url,

    /// The URL after redirects; relative links resolve against this
    pub final_url: Url,

    /// Rendered document markup
    pub html: String,
}

/// Errors raised while loading a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Timed out after {after:?} loading {url}")]
    Timeout { url: String, after: Duration },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("{url} is not HTML (content type {content_type})")]
    NotHtml { url: String, content_type: String },

    #[error("{url} exceeds the {limit} byte page limit")]
    TooLarge { url: String, limit: usize },

    #[error("Render session setup failed: {0}")]
    Setup(String),
}

impl From<RenderError> for CrawlError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Timeout { url, .. } => CrawlError::FetchTimeout { url },
            RenderError::Setup(message) => CrawlError::SessionSetup(message),
            RenderError::Navigation { ref url, .. }
            | RenderError::Status { ref url, .. }
            | RenderError::NotHtml { ref url, .. }
            | RenderError::TooLarge { ref url, .. } => CrawlError::FetchFailed {
                url: url.clone(),
                message: err.to_string(),
            },
        }
    }
}

/// Fails a load whose redirects left the requested authority
///
/// The page would otherwise be mirrored under an in-scope URL.
pub(crate) fn ensure_same_site(url: &Url, final_url: &Url) -> Result<(), RenderError> {
    if extract_authority(final_url) == extract_authority(url) {
        Ok(())
    } else {
        Err(RenderError::Navigation {
            url: url.to_string(),
            message: format!("redirected off-site to {}", final_url),
        })
    }
}

/// A long-lived, stateful page loader
///
/// Implementations are not required to support concurrent loads; the crawl
/// driver owns the session and calls `load` sequentially.
pub trait RenderSession {
    /// Loads `url`, waiting at most `timeout` for the page to settle
    fn load(
        &mut self,
        url: &Url,
        timeout: Duration,
    ) -> impl Future<Output = Result<RenderedPage, RenderError>> + Send;

    /// Releases the session's resources
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Render session selected from configuration
pub enum AnyRenderSession {
    Http(HttpRenderSession),
    #[cfg(feature = "browser")]
    Browser(BrowserRenderSession),
}

impl AnyRenderSession {
    /// Opens the session configured in `[render]`
    ///
    /// Failing to open a session is the one fatal crawl error.
    pub async fn open(config: &Config, client: Client) -> Result<Self, RenderError> {
        match config.render.backend {
            RenderBackend::Http => Ok(Self::Http(
                HttpRenderSession::new(client).with_body_limit(config.render.max_page_bytes),
            )),
            #[cfg(feature = "browser")]
            RenderBackend::Browser => {
                let session = BrowserRenderSession::launch(
                    &config.user_agent.header_value(),
                    &config.render,
                )
                .await?;
                Ok(Self::Browser(session))
            }
            #[cfg(not(feature = "browser"))]
            RenderBackend::Browser => {
                let _ = client;
                Err(RenderError::Setup(
                    "the browser backend requires building with the `browser` feature"
                        .to_string(),
                ))
            }
        }
    }
}

impl RenderSession for AnyRenderSession {
    async fn load(&mut self, url: &Url, timeout: Duration) -> Result<RenderedPage, RenderError> {
        match self {
            Self::Http(session) => session.load(url, timeout).await,
            #[cfg(feature = "browser")]
            Self::Browser(session) => session.load(url, timeout).await,
        }
    }

    async fn close(&mut self) {
        match self {
            Self::Http(session) => session.close().await,
            #[cfg(feature = "browser")]
            Self::Browser(session) => session.close().await,
        }
    }
}
