//! Output module
//!
//! This module handles:
//! - Writing page text and document links into the site mirror tree
//! - Atomic single-file writes shared with the document fetcher
//! - The end-of-crawl report

mod mirror;
pub mod stats;

pub use mirror::{mirror_paths, MirrorPaths, SiteMirror};
pub use stats::{print_report, CrawlReport};

use std::path::{Path, PathBuf};

/// Writes `bytes` to `path` through a sibling temporary file and a rename
///
/// Readers see either the old file or the complete new one, never a partial
/// write. The parent directory is created when missing.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp = temp_path(path);
    if let Err(e) = tokio::fs::write(&temp, bytes).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}
