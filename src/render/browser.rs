//! Headless Chromium render backend
//!
//! One browser process and one tab serve the whole crawl. Each load navigates
//! the tab, waits for navigation to finish, optionally clicks away a cookie
//! banner, then reads back the live DOM.

use super::consent::consent_script;
use super::{ensure_same_site, RenderError, RenderSession, RenderedPage};
use crate::config::RenderConfig;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Render session driving a single headless Chromium tab
pub struct BrowserRenderSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    consent: Option<(String, Duration)>,
    closed: bool,
}

impl BrowserRenderSession {
    /// Launches Chromium and opens the tab used for every load
    pub async fn launch(user_agent: &str, render: &RenderConfig) -> Result<Self, RenderError> {
        let config = BrowserConfig::builder()
            .arg(format!("--user-agent={}", user_agent))
            .build()
            .map_err(RenderError::Setup)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Setup(e.to_string()))?;

        // The CDP handler must be polled for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Setup(e.to_string()))?;

        let consent = render
            .dismiss_cookie_banner
            .then(|| (consent_script(&render.consent_patterns), render.consent_timeout()));

        tracing::info!("Headless browser session started");

        Ok(Self {
            browser,
            page,
            handler,
            consent,
            closed: false,
        })
    }

    async fn navigate(&self, url: &Url) -> Result<(), RenderError> {
        let navigation_error = |e: chromiumoxide::error::CdpError| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        self.page
            .goto(url.as_str())
            .await
            .map_err(navigation_error)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(navigation_error)?;
        Ok(())
    }

    async fn dismiss_consent(&self, url: &Url) {
        let Some((script, limit)) = &self.consent else {
            return;
        };

        match tokio::time::timeout(*limit, self.page.evaluate(script.as_str())).await {
            Ok(Ok(result)) => {
                if result.into_value::<bool>().unwrap_or(false) {
                    tracing::debug!("Dismissed cookie banner on {}", url);
                }
            }
            Ok(Err(e)) => tracing::trace!("Consent script failed on {}: {}", url, e),
            Err(_) => tracing::trace!("Consent dismissal timed out on {}", url),
        }
    }
}

impl RenderSession for BrowserRenderSession {
    async fn load(&mut self, url: &Url, timeout: Duration) -> Result<RenderedPage, RenderError> {
        tokio::time::timeout(timeout, self.navigate(url))
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                after: timeout,
            })??;

        self.dismiss_consent(url).await;

        let html = tokio::time::timeout(timeout, self.page.content())
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                after: timeout,
            })?
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let final_url = match self.page.url().await {
            Ok(Some(current)) => Url::parse(&current).unwrap_or_else(|_| url.clone()),
            _ => url.clone(),
        };
        ensure_same_site(url, &final_url)?;

        Ok(RenderedPage {
            url: url.clone(),
            final_url,
            html,
        })
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed waiting for browser exit: {}", e);
        }
        self.handler.abort();
        tracing::info!("Headless browser session closed");
    }
}
