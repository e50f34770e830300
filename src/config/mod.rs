//! Configuration module
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every setting has a default, so a crawl can run from
//! the command line alone.
//!
//! # Example
//!
//! ```no_run
//! use sitecrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Delay between pages: {:?}", config.crawler.delay());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DocumentNaming, ExtractionStrategy, OutputConfig, RenderBackend,
    RenderConfig, UserAgentConfig, MAX_DELAY_SECONDS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
