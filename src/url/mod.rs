//! URL handling module
//!
//! This module provides URL normalization, link resolution and the authority
//! comparison that defines crawl scope.

mod domain;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::extract_authority;
pub use normalize::{normalize_parsed, normalize_url, resolve_link};

/// Returns true if `url` has exactly the given authority
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::same_authority;
///
/// let url = Url::parse("https://example.com/b").unwrap();
/// assert!(same_authority(&url, "example.com"));
/// assert!(!same_authority(&url, "other.com"));
/// ```
pub fn same_authority(url: &Url, authority: &str) -> bool {
    extract_authority(url).is_some_and(|a| a == authority)
}
