use url::Url;

/// Extracts the network authority from a URL
///
/// The authority is the lowercase host plus the port when one is given
/// explicitly. Default ports are omitted, so `https://example.com:443/` and
/// `https://example.com/` share an authority. Two URLs are in the same crawl
/// scope iff their authorities are equal.
///
/// # Arguments
///
/// * `url` - The URL to extract the authority from
///
/// # Returns
///
/// * `Some(String)` - `host` or `host:port`
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::extract_authority;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
