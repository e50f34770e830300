//! Site mirror persistence
//!
//! Each page is stored at a path derived only from its URL:
//!
//! ```text
//! <site_root>/<authority>/<segment>/.../<last>.txt
//! <site_root>/<authority>/<segment>/.../<last>_document_links.json
//! ```
//!
//! An empty path maps to `index`. Query strings do not take part, so
//! `/list?page=2` overwrites `/list`.

use crate::crawler::PageResult;
use crate::output::write_atomic;
use crate::url::extract_authority;
use crate::{CrawlError, UrlError};
use std::path::{Path, PathBuf};
use url::Url;

/// File stem used for the site root and other empty paths
const INDEX_NAME: &str = "index";

/// Output locations for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPaths {
    pub dir: PathBuf,
    pub content: PathBuf,
    pub links: PathBuf,
}

/// Derives the mirror paths for a URL
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use url::Url;
/// use sitecrawl::output::mirror_paths;
///
/// let url = Url::parse("https://example.com/en/about/team").unwrap();
/// let paths = mirror_paths(Path::new("scraped_site"), &url).unwrap();
/// assert_eq!(paths.content, Path::new("scraped_site/example.com/en/about/team.txt"));
/// assert_eq!(paths.links, Path::new("scraped_site/example.com/en/about/team_document_links.json"));
/// ```
pub fn mirror_paths(site_root: &Path, url: &Url) -> Result<MirrorPaths, UrlError> {
    let authority = extract_authority(url).ok_or(UrlError::MissingDomain)?;

    let mut segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| match s {
                    // never step outside the mirror
                    "." | ".." => "_".to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let last = segments.pop().unwrap_or_else(|| INDEX_NAME.to_string());

    let mut dir = site_root.join(authority);
    for segment in &segments {
        dir.push(segment);
    }

    Ok(MirrorPaths {
        content: dir.join(format!("{}.txt", last)),
        links: dir.join(format!("{}_document_links.json", last)),
        dir,
    })
}

/// Writes page text and document links into the mirror tree
#[derive(Debug, Clone)]
pub struct SiteMirror {
    site_root: PathBuf,
}

impl SiteMirror {
    pub fn new(site_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
        }
    }

    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// Persists one page, replacing any earlier copy
    ///
    /// Both files are always written (an empty link list is `[]`), each
    /// atomically.
    pub async fn persist(&self, page: &PageResult) -> Result<MirrorPaths, CrawlError> {
        let paths = mirror_paths(&self.site_root, &page.url)?;

        tokio::fs::create_dir_all(&paths.dir)
            .await
            .map_err(|source| CrawlError::PersistenceFailed {
                path: paths.dir.clone(),
                source,
            })?;

        write_atomic(&paths.content, page.text.as_bytes())
            .await
            .map_err(|source| CrawlError::PersistenceFailed {
                path: paths.content.clone(),
                source,
            })?;

        let mut links = serde_json::to_vec_pretty(&page.document_links)?;
        links.push(b'\n');
        write_atomic(&paths.links, &links)
            .await
            .map_err(|source| CrawlError::PersistenceFailed {
                path: paths.links.clone(),
                source,
            })?;

        tracing::debug!("Persisted {} to {}", page.url, paths.content.display());
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::DocumentLink;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn page(url: &str, text: &str, documents: Vec<DocumentLink>) -> PageResult {
        PageResult {
            url: Url::parse(url).unwrap(),
            text: text.to_string(),
            navigable_links: BTreeSet::new(),
            document_links: documents,
        }
    }

    #[test]
    fn test_root_maps_to_index() {
        let url = Url::parse("https://example.com/").unwrap();
        let paths = mirror_paths(Path::new("out"), &url).unwrap();
        assert_eq!(paths.dir, Path::new("out/example.com"));
        assert_eq!(paths.content, Path::new("out/example.com/index.txt"));
        assert_eq!(
            paths.links,
            Path::new("out/example.com/index_document_links.json")
        );
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let a = Url::parse("https://example.com/docs/").unwrap();
        let b = Url::parse("https://example.com/docs").unwrap();
        assert_eq!(
            mirror_paths(Path::new("out"), &a).unwrap(),
            mirror_paths(Path::new("out"), &b).unwrap()
        );
    }

    #[test]
    fn test_query_does_not_change_path() {
        let url = Url::parse("https://example.com/list?page=2").unwrap();
        let paths = mirror_paths(Path::new("out"), &url).unwrap();
        assert_eq!(paths.content, Path::new("out/example.com/list.txt"));
    }

    #[test]
    fn test_port_kept_in_authority_dir() {
        let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
        let paths = mirror_paths(Path::new("out"), &url).unwrap();
        assert_eq!(paths.content, Path::new("out/127.0.0.1:8080/a.txt"));
    }

    #[test]
    fn test_dot_segments_neutralized() {
        let url = Url::parse("https://example.com/a/%2e%2e/b").unwrap();
        let paths = mirror_paths(Path::new("out"), &url).unwrap();
        assert!(paths.content.starts_with("out/example.com"));
    }

    #[tokio::test]
    async fn test_persist_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let mirror = SiteMirror::new(dir.path());
        let documents = vec![DocumentLink {
            text: "Annual Report".to_string(),
            url: "https://example.com/report.pdf".to_string(),
            file_type: "pdf".to_string(),
        }];

        let paths = mirror
            .persist(&page("https://example.com/a/b", "Hello", documents))
            .await
            .unwrap();

        assert_eq!(paths.content, dir.path().join("example.com/a/b.txt"));
        assert_eq!(std::fs::read_to_string(&paths.content).unwrap(), "Hello");

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.links).unwrap()).unwrap();
        assert_eq!(json[0]["text"], "Annual Report");
        assert_eq!(json[0]["type"], "pdf");
    }

    #[tokio::test]
    async fn test_persist_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mirror = SiteMirror::new(dir.path());
        let result = page("https://example.com/a", "Same text", vec![]);

        let first = mirror.persist(&result).await.unwrap();
        let content_before = std::fs::read(&first.content).unwrap();
        let links_before = std::fs::read(&first.links).unwrap();

        let second = mirror.persist(&result).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second.content).unwrap(), content_before);
        assert_eq!(std::fs::read(&second.links).unwrap(), links_before);
        assert_eq!(links_before, b"[]\n");
    }

    #[tokio::test]
    async fn test_recrawl_overwrites() {
        let dir = TempDir::new().unwrap();
        let mirror = SiteMirror::new(dir.path());

        mirror.persist(&page("https://example.com/a", "old", vec![])).await.unwrap();
        let paths = mirror.persist(&page("https://example.com/a", "new", vec![])).await.unwrap();
        assert_eq!(std::fs::read_to_string(paths.content).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_persist_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        // A regular file where the authority directory should go
        std::fs::write(dir.path().join("example.com"), b"").unwrap();
        let mirror = SiteMirror::new(dir.path());

        let result = mirror.persist(&page("https://example.com/a/b", "x", vec![])).await;
        assert!(matches!(result, Err(CrawlError::PersistenceFailed { .. })));
    }
}
