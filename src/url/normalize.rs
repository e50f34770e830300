use crate::UrlError;
use url::Url;

/// Href prefixes that never lead to a fetchable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes a URL for use as a visited/frontier key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an `http` or `https` scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Host case and dot segments are already normalized by the parser. Query
/// strings are kept: `/list?page=2` is a different page from `/list`.
///
/// # Examples
///
/// ```
/// use sitecrawl::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/a/../b#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/b");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL (see [`normalize_url`])
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves an anchor href against the page it appears on
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - hrefs that do not resolve to an HTTP(S) URL
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_parsed(absolute).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/dir/page").unwrap()
    }

    #[test]
    fn test_fragment_removed() {
        let url = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_query_kept() {
        let url = normalize_url("https://example.com/list?page=2").unwrap();
        assert_eq!(url.as_str(), "https://example.com/list?page=2");
    }

    #[test]
    fn test_host_lowercased() {
        let url = normalize_url("https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Path");
    }

    #[test]
    fn test_reject_ftp() {
        assert!(matches!(
            normalize_url("ftp://example.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_reject_garbage() {
        assert!(matches!(
            normalize_url("not a url"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_resolve_absolute() {
        let resolved = resolve_link("https://other.com/c", &base_url()).unwrap();
        assert_eq!(resolved.as_str(), "https://other.com/c");
    }

    #[test]
    fn test_resolve_root_relative() {
        let resolved = resolve_link("/b", &base_url()).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/b");
    }

    #[test]
    fn test_resolve_path_relative() {
        let resolved = resolve_link("report.pdf", &base_url()).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/dir/report.pdf");
    }

    #[test]
    fn test_resolve_strips_fragment() {
        let resolved = resolve_link("/b#part", &base_url()).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/b");
    }

    #[test]
    fn test_resolve_skips_special_schemes() {
        assert!(resolve_link("javascript:void(0)", &base_url()).is_none());
        assert!(resolve_link("MAILTO:someone@example.com", &base_url()).is_none());
        assert!(resolve_link("tel:+358401234567", &base_url()).is_none());
        assert!(resolve_link("data:text/html,<h1>x</h1>", &base_url()).is_none());
    }

    #[test]
    fn test_resolve_skips_fragment_only_and_empty() {
        assert!(resolve_link("#top", &base_url()).is_none());
        assert!(resolve_link("   ", &base_url()).is_none());
    }
}
