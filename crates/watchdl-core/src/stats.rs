//! Progress aggregation: fold structured events into a stats snapshot.
//!
//! The fold is a pure function of the previous snapshot and one event, so
//! replaying the same event stream from the same starting snapshot always
//! yields the same result. Item totals are folded with a monotonic max:
//! because pages from different entities interleave, a later, smaller
//! running total must never regress the displayed aggregate.

use std::time::Instant;

use crate::events::ProgressEvent;

/// Status label for one scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Cancelled => "cancelled",
        }
    }
}

/// Aggregate counters for one scheduler run (consumer-owned; reading never
/// blocks the loops, which only ever touch the event channel).
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub total_entities: usize,
    /// Terminal events seen, success and failure alike.
    pub completed_entities: usize,
    /// Highest observed running item count across all entities.
    pub total_items: u64,
    /// Highest observed newly-written count across all entities.
    pub new_items: u64,
    pub started_at: Instant,
    pub status: RunStatus,
}

impl StatsSnapshot {
    pub fn new(total_entities: usize) -> Self {
        Self {
            total_entities,
            completed_entities: 0,
            total_items: 0,
            new_items: 0,
            started_at: Instant::now(),
            status: RunStatus::Running,
        }
    }

    /// Fold one event into the snapshot.
    pub fn apply(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::PageFetched { total_items, .. } => {
                self.total_items = self.total_items.max(*total_items);
            }
            ProgressEvent::BatchDownloaded { total_new, .. } => {
                self.new_items = self.new_items.max(*total_new);
            }
            ProgressEvent::CycleFinished { .. } => {
                self.completed_entities += 1;
                if self.status == RunStatus::Running
                    && self.completed_entities >= self.total_entities
                {
                    self.status = RunStatus::Completed;
                }
            }
            ProgressEvent::Note { .. } => {}
        }
    }

    /// Mark the run as cancelled. Sticky: later terminals still tally but
    /// no longer flip the status to completed.
    pub fn mark_cancelled(&mut self) {
        self.status = RunStatus::Cancelled;
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
