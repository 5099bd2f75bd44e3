//! Per-entity monitor loop.
//!
//! Drives one entity's fetch/download cycle: resolve the destination, page
//! through the content source, hand each page to the downloader, emit
//! progress events, and record the cycle in the history ledger. With
//! monitoring enabled the loop sleeps for the configured interval
//! (cancellable at one-second granularity) and starts a fresh cycle.
//!
//! Collaborator failures are absorbed here: they end this entity's cycle as
//! a failure terminal and never propagate to sibling loops.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::WatchdlConfig;
use crate::control::CancelToken;
use crate::error::CycleError;
use crate::events::{emit, CycleOutcome, EventSender, ProgressEvent};
use crate::history::{DownloadStatus, HistoryLedger};
use crate::source::{ContentSource, DestinationResolver, ItemDownloader};

/// One tracked entity's download request. Immutable for the lifetime of one
/// loop invocation; each monitor wake-up starts a fresh cycle.
#[derive(Debug, Clone)]
pub struct EntityJob {
    pub entity_id: String,
    /// Lower cursor bound of the time-range filter (0 = unbounded).
    pub min_cursor: u64,
    /// Upper cursor bound; paging starts here (0 = newest).
    pub max_cursor: u64,
    pub page_size: usize,
    /// Stop the cycle once this many items have been seen (None = no cap).
    pub max_items: Option<u64>,
    /// Re-run the cycle at `monitor_interval` until cancelled.
    pub monitor: bool,
    pub monitor_interval: Duration,
}

impl EntityJob {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            min_cursor: 0,
            max_cursor: 0,
            page_size: 20,
            max_items: None,
            monitor: false,
            monitor_interval: Duration::from_secs(60 * 60),
        }
    }

    /// Job with defaults taken from the config.
    pub fn from_config(entity_id: impl Into<String>, cfg: &WatchdlConfig) -> Self {
        Self {
            page_size: cfg.page_size.max(1),
            max_items: cfg.max_items,
            monitor_interval: Duration::from_secs(cfg.monitor_interval_mins * 60),
            ..Self::new(entity_id)
        }
    }
}

/// Shared collaborator handles driven by every monitor loop.
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<dyn ContentSource>,
    pub downloader: Arc<dyn ItemDownloader>,
    pub resolver: Arc<dyn DestinationResolver>,
}

/// How one entity loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Completed,
    Failed,
    Cancelled,
}

struct CycleStats {
    total_seen: u64,
    total_new: u64,
    display_name: Option<String>,
    cancelled: bool,
}

/// Run one entity's loop to termination: a single cycle, or, when
/// monitoring is enabled, cycles separated by interruptible waits.
pub async fn run_entity_loop(
    job: &EntityJob,
    collab: &Collaborators,
    ledger: &Arc<Mutex<HistoryLedger>>,
    events: &EventSender,
    cancel: &CancelToken,
) -> LoopExit {
    loop {
        let exit = run_one_cycle(job, collab, ledger, events, cancel).await;
        if exit == LoopExit::Cancelled || cancel.is_cancelled() || !job.monitor {
            return exit;
        }
        if !wait_for_next_cycle(job, events, cancel).await {
            return LoopExit::Cancelled;
        }
    }
}

async fn run_one_cycle(
    job: &EntityJob,
    collab: &Collaborators,
    ledger: &Arc<Mutex<HistoryLedger>>,
    events: &EventSender,
    cancel: &CancelToken,
) -> LoopExit {
    let id = &job.entity_id;
    emit(events, ProgressEvent::note(id, "starting download cycle")).await;

    match fetch_cycle(job, collab, events, cancel).await {
        Ok(stats) if stats.cancelled => {
            emit(events, ProgressEvent::note(id, "cancelled before completion")).await;
            LoopExit::Cancelled
        }
        Ok(stats) => {
            emit(
                events,
                ProgressEvent::note(
                    id,
                    format!(
                        "cycle complete: {} item(s) seen, {} newly written",
                        stats.total_seen, stats.total_new
                    ),
                ),
            )
            .await;
            emit(
                events,
                ProgressEvent::CycleFinished {
                    entity_id: id.clone(),
                    outcome: CycleOutcome::Success,
                },
            )
            .await;
            record_cycle(
                ledger,
                events,
                id,
                stats.display_name.as_deref(),
                DownloadStatus::Success,
                stats.total_new,
            )
            .await;
            LoopExit::Completed
        }
        Err(err) => {
            emit(events, ProgressEvent::note(id, format!("download failed: {err}"))).await;
            emit(
                events,
                ProgressEvent::CycleFinished {
                    entity_id: id.clone(),
                    outcome: CycleOutcome::Failed {
                        reason: err.to_string(),
                    },
                },
            )
            .await;
            record_cycle(ledger, events, id, None, DownloadStatus::Failure, 0).await;
            LoopExit::Failed
        }
    }
}

/// Upsert the cycle result. A failed persist is surfaced as a diagnostic
/// but does not fail the cycle; the in-memory record stays mutated.
async fn record_cycle(
    ledger: &Arc<Mutex<HistoryLedger>>,
    events: &EventSender,
    entity_id: &str,
    display_name: Option<&str>,
    status: DownloadStatus,
    new_items: u64,
) {
    let mut ledger = ledger.lock().await;
    if let Err(e) = ledger.upsert(entity_id, display_name, status, new_items) {
        tracing::warn!(entity_id, error = %e, "history persist failed");
        emit(
            events,
            ProgressEvent::note(entity_id, format!("history not saved: {e}")),
        )
        .await;
    }
}

async fn fetch_cycle(
    job: &EntityJob,
    collab: &Collaborators,
    events: &EventSender,
    cancel: &CancelToken,
) -> Result<CycleStats, CycleError> {
    let id = &job.entity_id;
    let dest = collab.resolver.ensure_destination(id).await?;
    let mut stats = CycleStats {
        total_seen: 0,
        total_new: 0,
        display_name: dest.display_name.clone(),
        cancelled: false,
    };
    if let Some(name) = &dest.display_name {
        emit(events, ProgressEvent::note(id, format!("resolved as {name}"))).await;
    }

    let mut cursor = job.max_cursor;
    loop {
        if cancel.is_cancelled() {
            stats.cancelled = true;
            return Ok(stats);
        }

        let page = collab.source.fetch_page(id, cursor, job.page_size).await?;
        if page.items.is_empty() {
            if stats.total_seen == 0 {
                return Err(CycleError::EmptyFetch);
            }
            // Sources may return an empty page before flagging exhaustion
            // (time-filtered ranges); the cycle is done either way.
            break;
        }

        stats.total_seen += page.items.len() as u64;
        emit(
            events,
            ProgressEvent::PageFetched {
                entity_id: id.clone(),
                page_items: page.items.len(),
                total_items: stats.total_seen,
            },
        )
        .await;

        let newly_written = collab.downloader.write_items(&page.items, &dest.dir).await?;
        if newly_written > 0 {
            stats.total_new += newly_written as u64;
            emit(
                events,
                ProgressEvent::BatchDownloaded {
                    entity_id: id.clone(),
                    batch_new: newly_written,
                    total_new: stats.total_new,
                },
            )
            .await;
        }

        if page.exhausted {
            break;
        }
        if let Some(cap) = job.max_items {
            if stats.total_seen >= cap {
                emit(events, ProgressEvent::note(id, "item cap reached")).await;
                break;
            }
        }
        // Cursors descend toward older content; a next cursor below the
        // lower bound means the time range is exhausted.
        if job.min_cursor > 0 && page.next_cursor < job.min_cursor {
            break;
        }
        cursor = page.next_cursor;
    }

    Ok(stats)
}

/// Sleep until the next monitor cycle, checking the cancel token every
/// second and reporting remaining time once per minute. Returns false if
/// cancelled during the wait.
async fn wait_for_next_cycle(job: &EntityJob, events: &EventSender, cancel: &CancelToken) -> bool {
    let total_secs = job.monitor_interval.as_secs();
    emit(
        events,
        ProgressEvent::note(
            &job.entity_id,
            format!("monitoring: next check in {} minute(s)", total_secs / 60),
        ),
    )
    .await;

    for elapsed in 0..total_secs {
        if cancel.is_cancelled() {
            return false;
        }
        if elapsed > 0 && elapsed % 60 == 0 {
            let remaining_mins = (total_secs - elapsed) / 60;
            emit(
                events,
                ProgressEvent::note(
                    &job.entity_id,
                    format!("waiting for next check, {remaining_mins} minute(s) remain"),
                ),
            )
            .await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    !cancel.is_cancelled()
}
