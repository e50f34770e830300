//! Sitecrawl: a scoped, polite site mirror
//!
//! This crate crawls every reachable page of a single site, respecting
//! robots.txt and a per-request delay. Page text and document links are written
//! to a directory tree that mirrors the site's URL structure, and linked
//! documents (spreadsheets, PDFs, office files) are downloaded into a
//! deduplicated artifact store.

pub mod config;
pub mod crawler;
pub mod output;
pub mod render;
pub mod robots;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render timed out for {url}")]
    FetchTimeout { url: String },

    #[error("Fetch failed for {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("Failed to persist {path}: {source}")]
    PersistenceFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not load robots.txt: {0}")]
    PolicyLoadFailed(String),

    #[error("Failed to start render session: {0}")]
    SessionSetup(String),

    #[error("Invalid crawl phase transition from {from:?} to {to:?}")]
    InvalidTransition { from: CrawlPhase, to: CrawlPhase },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CancelToken, Coordinator};
pub use output::CrawlReport;
pub use state::{CrawlPhase, PageState};
pub use url::{extract_authority, normalize_url};
