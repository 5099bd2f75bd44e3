//! Collaborator seams: content source, item downloader, destination resolver.
//!
//! The HTTP/scraping client and the media writer live outside this crate.
//! The orchestration core drives them through these object-safe async traits
//! so the scheduler and monitor loops can be exercised against scripted
//! implementations in tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{FetchError, ResolutionError, WriteError};

/// One remote content item as seen by the orchestrator.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Source-assigned item id.
    pub id: String,
    /// Short description, if the source provides one.
    pub desc: Option<String>,
    /// Creation time as epoch seconds.
    pub created_at: i64,
}

/// One page of items from the content source.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<ContentItem>,
    /// Cursor to request the following (older) page with.
    pub next_cursor: u64,
    /// True when the source has no further pages.
    pub exhausted: bool,
}

/// Destination prepared for one entity's items.
#[derive(Debug, Clone)]
pub struct Destination {
    pub dir: PathBuf,
    /// Display name resolved alongside the directory (profile nickname).
    pub display_name: Option<String>,
}

/// Pages through an entity's content, newest first.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch one page starting at `cursor` (0 = newest).
    async fn fetch_page(
        &self,
        entity_id: &str,
        cursor: u64,
        page_size: usize,
    ) -> Result<Page, FetchError>;
}

/// Persists fetched items under a destination directory.
#[async_trait]
pub trait ItemDownloader: Send + Sync {
    /// Write the items and return how many were newly written (items already
    /// present on disk are skipped and not counted).
    async fn write_items(
        &self,
        items: &[ContentItem],
        dest: &Path,
    ) -> Result<usize, WriteError>;
}

/// Prepares (and creates if absent) the destination for one entity.
#[async_trait]
pub trait DestinationResolver: Send + Sync {
    async fn ensure_destination(&self, entity_id: &str) -> Result<Destination, ResolutionError>;
}
