//! Page extractor
//!
//! Turns a rendered page into:
//! - its visible text, per the configured [`ExtractionStrategy`]
//! - the in-scope links worth crawling next
//! - the links to downloadable documents, matched by file extension
//!
//! Missing or malformed markup never produces an error, only empty results.

use crate::config::ExtractionStrategy;
use crate::render::RenderedPage;
use crate::url::{resolve_link, same_authority};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use url::Url;

/// Elements whose text is never part of the visible content
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Containers tried in order by [`ExtractionStrategy::MainContent`]
const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    "#content",
    ".content",
];

/// A link to a downloadable document
///
/// Serialized as `{"text": ..., "url": ..., "type": ...}` in the page's
/// `_document_links.json` sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentLink {
    /// Visible anchor text, whitespace-collapsed
    pub text: String,

    /// Absolute document URL; the link's identity
    pub url: String,

    /// Matched extension, lowercase; selects the artifact subdirectory
    #[serde(rename = "type")]
    pub file_type: String,
}

/// Everything extracted from one page
#[derive(Debug, Clone)]
pub struct PageResult {
    pub url: Url,
    pub text: String,
    pub navigable_links: BTreeSet<Url>,
    pub document_links: Vec<DocumentLink>,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extracts text and links from rendered pages of one site
#[derive(Debug, Clone)]
pub struct Extractor {
    authority: String,
    document_extensions: Vec<String>,
    strategy: ExtractionStrategy,
}

impl Extractor {
    /// Creates an extractor for the site with the given authority
    ///
    /// Extensions are matched case-insensitively and given without a dot.
    pub fn new(
        authority: impl Into<String>,
        document_extensions: &[String],
        strategy: ExtractionStrategy,
    ) -> Self {
        Self {
            authority: authority.into(),
            document_extensions: document_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            strategy,
        }
    }

    /// Extracts a [`PageResult`] from a rendered page
    ///
    /// # Link Extraction Rules
    ///
    /// - hrefs resolve against the page's final URL (after redirects)
    /// - fragments are dropped; javascript:, mailto:, tel:, data: are skipped
    /// - a link whose path ends in a document extension becomes a
    ///   [`DocumentLink`] (any host) and is never a navigable link
    /// - document links with no visible text are discarded
    /// - every other link is navigable iff it shares the site's authority
    pub fn extract(&self, page: &RenderedPage) -> PageResult {
        let document = Html::parse_document(&page.html);
        let text = self.extract_text(&document);

        let mut navigable_links = BTreeSet::new();
        let mut document_links = Vec::new();
        let mut seen_documents = HashSet::new();

        if let Ok(anchor_selector) = Selector::parse("a[href]") {
            for anchor in document.select(&anchor_selector) {
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                let Some(target) = resolve_link(href, &page.final_url) else {
                    continue;
                };

                if let Some(file_type) = self.document_type(&target) {
                    let text = collapse_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
                    if text.is_empty() {
                        tracing::trace!("Skipping untitled document link {}", target);
                        continue;
                    }
                    if seen_documents.insert(target.to_string()) {
                        document_links.push(DocumentLink {
                            text,
                            url: target.to_string(),
                            file_type,
                        });
                    }
                } else if same_authority(&target, &self.authority) {
                    navigable_links.insert(target);
                }
            }
        }

        PageResult {
            url: page.url.clone(),
            text,
            navigable_links,
            document_links,
        }
    }

    /// Returns the matched document extension for `url`, if any
    pub fn document_type(&self, url: &Url) -> Option<String> {
        let last = url.path_segments()?.last()?;
        let (_, ext) = last.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        self.document_extensions.contains(&ext).then_some(ext)
    }

    fn extract_text(&self, document: &Html) -> String {
        match self.strategy {
            ExtractionStrategy::StrippedBody => stripped_body_text(document),
            ExtractionStrategy::PlainText => {
                let parts: Vec<&str> = document
                    .root_element()
                    .text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect();
                parts.join("\n")
            }
            ExtractionStrategy::MainContent => MAIN_CONTENT_SELECTORS
                .iter()
                .filter_map(|s| Selector::parse(s).ok())
                .find_map(|selector| document.select(&selector).next())
                .map(visible_text)
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| stripped_body_text(document)),
        }
    }
}

/// Visible text of `<body>` (or the whole document when there is no body)
fn stripped_body_text(document: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());
    visible_text(body)
}

/// Joins the element's text nodes line by line, skipping non-content elements
fn visible_text(element: ElementRef<'_>) -> String {
    let mut lines = Vec::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_CONTENT_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let line = collapse_whitespace(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
