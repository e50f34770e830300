use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Longest politeness delay accepted from config or robots.txt (one hour)
pub const MAX_DELAY_SECONDS: f64 = 3600.0;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Politeness delay between page loads (seconds)
    pub delay_seconds: f64,

    /// Page render timeout (milliseconds)
    pub timeout_ms: u64,

    /// Document download timeout (milliseconds)
    pub document_timeout_ms: u64,

    /// Maximum number of documents downloaded at once
    pub concurrent_downloads: usize,

    /// Stop after this many pages have been rendered
    pub max_pages: Option<usize>,

    /// Use the robots.txt Crawl-delay when it exceeds `delay_seconds`
    pub respect_crawl_delay: bool,

    /// How visible text is pulled out of a rendered page
    pub extraction_strategy: ExtractionStrategy,

    /// File extensions treated as downloadable documents
    pub document_extensions: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 1.0,
            timeout_ms: 30_000,
            document_timeout_ms: 30_000,
            concurrent_downloads: 4,
            max_pages: None,
            respect_crawl_delay: true,
            extraction_strategy: ExtractionStrategy::default(),
            document_extensions: [
                "xlsx", "xls", "csv", "pdf", "doc", "docx", "ppt", "pptx", "odt", "ods",
            ]
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
        }
    }
}

impl CrawlerConfig {
    /// Politeness delay, clamped to `0..=MAX_DELAY_SECONDS`
    ///
    /// A NaN delay (only possible on an unvalidated config) yields zero.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_seconds.clamp(0.0, MAX_DELAY_SECONDS))
            .unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn document_timeout(&self) -> Duration {
        Duration::from_millis(self.document_timeout_ms)
    }
}

/// Text extraction strategy applied to every rendered page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// Body text with script, style and noscript elements stripped
    #[default]
    StrippedBody,
    /// Every text node of the document
    PlainText,
    /// Text of the first article/main-like container, falling back to the stripped body
    MainContent,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler, also the token matched against robots.txt groups
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "sitecrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the full User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Render backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderBackend {
    /// Plain HTTP fetch of the served HTML
    #[default]
    Http,
    /// Headless Chromium (requires the `browser` feature)
    Browser,
}

/// Render session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    pub backend: RenderBackend,

    /// Try to click away cookie consent banners after each load
    pub dismiss_cookie_banner: bool,

    /// Upper bound for the consent dismissal step (milliseconds)
    pub consent_timeout_ms: u64,

    /// Button texts recognised as "accept" on consent banners
    pub consent_patterns: Vec<String>,

    /// Largest page body the HTTP backend reads before failing the page
    pub max_page_bytes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: RenderBackend::default(),
            dismiss_cookie_banner: true,
            consent_timeout_ms: 2_000,
            consent_patterns: crate::render::consent::DEFAULT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_page_bytes: crate::render::MAX_PAGE_BYTES,
        }
    }
}

impl RenderConfig {
    pub fn consent_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_timeout_ms)
    }
}

/// How downloaded documents are named in the artifact store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentNaming {
    /// `<sanitized text>.<type>`; colliding names keep the first download
    #[default]
    DisplayText,
    /// `<sanitized text>-<url hash>.<type>`; distinct URLs never collide
    DisplayTextWithHash,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root of the page mirror tree
    pub site_root: PathBuf,

    /// Root of the downloaded document store
    pub artifact_root: PathBuf,

    pub document_naming: DocumentNaming,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            site_root: PathBuf::from("scraped_site"),
            artifact_root: PathBuf::from("downloaded_files"),
            document_naming: DocumentNaming::default(),
        }
    }
}
