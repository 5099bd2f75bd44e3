//! Scripted collaborators for scheduler/monitor integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use watchdl_core::error::{FetchError, ResolutionError, WriteError};
use watchdl_core::monitor::Collaborators;
use watchdl_core::source::{
    ContentItem, ContentSource, Destination, DestinationResolver, ItemDownloader, Page,
};

pub fn item(id: &str, created_at: i64) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        desc: None,
        created_at,
    }
}

/// Page of `n` synthetic items.
pub fn page_of(n: usize, next_cursor: u64, exhausted: bool) -> Page {
    Page {
        items: (0..n).map(|i| item(&format!("item-{i}"), 1_700_000_000 + i as i64)).collect(),
        next_cursor,
        exhausted,
    }
}

pub fn empty_page() -> Page {
    Page {
        items: Vec::new(),
        next_cursor: 0,
        exhausted: true,
    }
}

/// Tracks how many fetches are in flight and the highest count seen.
#[derive(Default)]
pub struct ConcurrencyGauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyGauge {
    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Content source that replays a per-entity script of pages. Once a script
/// drains, further fetches return an empty exhausted page.
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, Vec<Result<Page, FetchError>>>>,
    pub fetch_delay: Duration,
    pub gauge: Arc<ConcurrencyGauge>,
    pub fetches: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fetch_delay: Duration::ZERO,
            gauge: Arc::new(ConcurrencyGauge::default()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn script(self, entity_id: &str, pages: Vec<Result<Page, FetchError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(entity_id.to_string(), pages);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn fetch_page(
        &self,
        entity_id: &str,
        _cursor: u64,
        _page_size: usize,
    ) -> Result<Page, FetchError> {
        self.gauge.enter();
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        let next = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(entity_id) {
                Some(pages) if !pages.is_empty() => Some(pages.remove(0)),
                _ => None,
            }
        };
        self.gauge.exit();
        next.unwrap_or_else(|| Ok(empty_page()))
    }
}

/// Downloader that treats every handed item as newly written.
#[derive(Default)]
pub struct CountingDownloader {
    pub written: AtomicUsize,
    pub fail: bool,
}

impl CountingDownloader {
    pub fn failing() -> Self {
        Self {
            written: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn written_count(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemDownloader for CountingDownloader {
    async fn write_items(&self, items: &[ContentItem], _dest: &Path) -> Result<usize, WriteError> {
        if self.fail {
            return Err(WriteError::Other("disk full".into()));
        }
        self.written.fetch_add(items.len(), Ordering::SeqCst);
        Ok(items.len())
    }
}

/// Resolver returning a fixed directory and display name.
pub struct StaticResolver {
    pub dir: PathBuf,
    pub display_name: Option<String>,
    pub fail: bool,
}

impl StaticResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            display_name: Some("Alice".to_string()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            dir: PathBuf::new(),
            display_name: None,
            fail: true,
        }
    }
}

#[async_trait]
impl DestinationResolver for StaticResolver {
    async fn ensure_destination(&self, entity_id: &str) -> Result<Destination, ResolutionError> {
        if self.fail {
            return Err(ResolutionError {
                entity_id: entity_id.to_string(),
                reason: "permission denied".into(),
            });
        }
        Ok(Destination {
            dir: self.dir.join(entity_id),
            display_name: self.display_name.clone(),
        })
    }
}

pub fn collaborators(
    source: ScriptedSource,
    downloader: CountingDownloader,
    resolver: StaticResolver,
) -> (Collaborators, Arc<ScriptedSource>) {
    let source = Arc::new(source);
    let collab = Collaborators {
        source: Arc::clone(&source) as Arc<dyn ContentSource>,
        downloader: Arc::new(downloader),
        resolver: Arc::new(resolver),
    };
    (collab, source)
}
