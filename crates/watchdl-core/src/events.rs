//! Structured progress events emitted by monitor loops.
//!
//! Events for the same entity are causally ordered (fetch before download
//! before terminal); events from different entities interleave freely. The
//! aggregator in `stats` folds these without any string parsing.

use tokio::sync::mpsc;

/// Outcome carried by a terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Success,
    Failed { reason: String },
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::Success)
    }
}

/// One progress signal from a monitor loop.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A page of items was fetched. `total_items` is the entity's running count.
    PageFetched {
        entity_id: String,
        page_items: usize,
        total_items: u64,
    },
    /// A batch of items was newly written (deduplicated count, not page size).
    BatchDownloaded {
        entity_id: String,
        batch_new: usize,
        total_new: u64,
    },
    /// One cycle finished, successfully or not.
    CycleFinished {
        entity_id: String,
        outcome: CycleOutcome,
    },
    /// Free-text diagnostic line.
    Note {
        entity_id: Option<String>,
        message: String,
    },
}

impl ProgressEvent {
    pub fn note(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        ProgressEvent::Note {
            entity_id: Some(entity_id.into()),
            message: message.into(),
        }
    }

    /// Human-readable line for the log sink and CLI display.
    pub fn display_line(&self) -> String {
        match self {
            ProgressEvent::PageFetched {
                entity_id,
                page_items,
                total_items,
            } => format!("{entity_id}: fetched {page_items} item(s), {total_items} total"),
            ProgressEvent::BatchDownloaded {
                entity_id,
                batch_new,
                total_new,
            } => format!("{entity_id}: wrote {batch_new} new item(s), {total_new} new total"),
            ProgressEvent::CycleFinished { entity_id, outcome } => match outcome {
                CycleOutcome::Success => format!("{entity_id}: cycle completed"),
                CycleOutcome::Failed { reason } => format!("{entity_id}: cycle failed: {reason}"),
            },
            ProgressEvent::Note { entity_id, message } => match entity_id {
                Some(id) => format!("{id}: {message}"),
                None => message.clone(),
            },
        }
    }
}

pub type EventSender = mpsc::Sender<ProgressEvent>;
pub type EventReceiver = mpsc::Receiver<ProgressEvent>;

/// Create the progress channel connecting monitor loops to a consumer.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Log and forward an event. A detached consumer is not an error; the line
/// still reaches the log sink.
pub(crate) async fn emit(tx: &EventSender, event: ProgressEvent) {
    tracing::debug!("{}", event.display_line());
    let _ = tx.send(event).await;
}
