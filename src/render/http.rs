//! HTTP render backend
//!
//! Fetches the HTML exactly as served. A page counts as settled once its body
//! has been read completely; no script runs, so there is no cookie banner to
//! dismiss.
//!
//! A redirect that leaves the requested authority fails the load, and bodies
//! larger than the page limit are abandoned mid-read.

use super::{ensure_same_site, RenderError, RenderSession, RenderedPage};
use crate::config::UserAgentConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds the HTTP client shared by the render session, robots.txt loading
/// and document downloads
///
/// Redirects are followed (up to reqwest's default of 10 hops); timeouts are
/// applied per request by the callers.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Largest page body read by default (10 MiB)
pub const MAX_PAGE_BYTES: usize = 10 * 1024 * 1024;

/// Render session backed by plain HTTP requests
#[derive(Debug, Clone)]
pub struct HttpRenderSession {
    client: Client,
    max_body_bytes: usize,
}

impl HttpRenderSession {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_body_bytes: MAX_PAGE_BYTES,
        }
    }

    /// Sets the largest page body this session will read
    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<RenderedPage, RenderError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e, timeout))?;

        let final_url = response.url().clone();
        ensure_same_site(url, &final_url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        // A missing header is given the benefit of the doubt
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(RenderError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let too_large = || RenderError::TooLarge {
            url: url.to_string(),
            limit: self.max_body_bytes,
        };

        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(too_large());
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| classify_error(url, e, timeout))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(RenderedPage {
            url: url.clone(),
            final_url,
            html: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

impl RenderSession for HttpRenderSession {
    async fn load(&mut self, url: &Url, timeout: Duration) -> Result<RenderedPage, RenderError> {
        // Bounds headers and body together
        match tokio::time::timeout(timeout, self.fetch(url, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                url: url.to_string(),
                after: timeout,
            }),
        }
    }

    async fn close(&mut self) {
        tracing::debug!("HTTP render session closed");
    }
}

fn classify_error(url: &Url, error: reqwest::Error, timeout: Duration) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
            after: timeout,
        }
    } else {
        RenderError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
