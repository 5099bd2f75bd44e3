//! Bounded-concurrency scheduler: one monitor loop per tracked entity,
//! admission-gated by a counting semaphore.
//!
//! Each entity loop holds its admission slot for its entire lifetime,
//! monitor waits included: the loop is one logical long-running task per
//! entity, not one task per page. The run completes only when every loop
//! has exited (cooperatively, on cancellation, or by exhausting its pages).

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::control::CancelToken;
use crate::events::{emit, EventSender, ProgressEvent};
use crate::history::HistoryLedger;
use crate::monitor::{self, Collaborators, EntityJob, LoopExit};

/// Tallies of how the entity loops ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u32,
    pub failed: u32,
    pub cancelled: u32,
}

impl RunSummary {
    pub fn total(&self) -> u32 {
        self.completed + self.failed + self.cancelled
    }
}

pub struct Scheduler {
    collaborators: Collaborators,
    ledger: Arc<Mutex<HistoryLedger>>,
    max_concurrent: usize,
}

impl Scheduler {
    pub fn new(collaborators: Collaborators, ledger: HistoryLedger, max_concurrent: usize) -> Self {
        Self {
            collaborators,
            ledger: Arc::new(Mutex::new(ledger)),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Shared ledger handle, for history queries alongside a running batch.
    pub fn ledger(&self) -> Arc<Mutex<HistoryLedger>> {
        Arc::clone(&self.ledger)
    }

    /// Run every job to termination under the admission cap. Individual
    /// loop failures (and panics) are tallied, never propagated: one
    /// entity's failure must not take its siblings down.
    pub async fn run(
        &self,
        jobs: Vec<EntityJob>,
        events: EventSender,
        cancel: CancelToken,
    ) -> RunSummary {
        emit(
            &events,
            ProgressEvent::Note {
                entity_id: None,
                message: format!("starting batch download for {} entities", jobs.len()),
            },
        )
        .await;

        let limiter = Arc::new(Semaphore::new(self.max_concurrent));
        let mut join_set = JoinSet::new();
        for job in jobs {
            let limiter = Arc::clone(&limiter);
            let collab = self.collaborators.clone();
            let ledger = Arc::clone(&self.ledger);
            let events = events.clone();
            let cancel = cancel.clone();
            join_set.spawn(async move {
                let Ok(_permit) = limiter.acquire_owned().await else {
                    return LoopExit::Cancelled;
                };
                if cancel.is_cancelled() {
                    return LoopExit::Cancelled;
                }
                monitor::run_entity_loop(&job, &collab, &ledger, &events, &cancel).await
            });
        }

        let mut summary = RunSummary::default();
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(LoopExit::Completed) => summary.completed += 1,
                Ok(LoopExit::Failed) => summary.failed += 1,
                Ok(LoopExit::Cancelled) => summary.cancelled += 1,
                Err(e) => {
                    tracing::error!(error = %e, "entity loop task panicked");
                    summary.failed += 1;
                }
            }
        }

        emit(
            &events,
            ProgressEvent::Note {
                entity_id: None,
                message: format!(
                    "batch finished: {} completed, {} failed, {} cancelled",
                    summary.completed, summary.failed, summary.cancelled
                ),
            },
        )
        .await;
        summary
    }

    /// Spawn `run` in the background and return a control handle.
    pub fn start(self: &Arc<Self>, jobs: Vec<EntityJob>, events: EventSender) -> RunHandle {
        let cancel = CancelToken::new();
        let scheduler = Arc::clone(self);
        let task_cancel = cancel.clone();
        let task =
            tokio::spawn(async move { scheduler.run(jobs, events, task_cancel).await });
        RunHandle { cancel, task }
    }
}

/// Handle to a background scheduler run.
pub struct RunHandle {
    cancel: CancelToken,
    task: tokio::task::JoinHandle<RunSummary>,
}

impl RunHandle {
    /// Request cancellation; loops wind down within one page fetch or one
    /// wait tick.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for every loop to drain.
    pub async fn wait(self) -> RunSummary {
        self.task.await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "scheduler task panicked");
            RunSummary::default()
        })
    }

    /// Wait up to `timeout` for the loops to drain. Expiry is reported, not
    /// an error: the caller may wait again or abandon the loops as orphaned
    /// background work.
    pub async fn wait_timeout(&mut self, timeout: Duration) -> Option<RunSummary> {
        match tokio::time::timeout(timeout, &mut self.task).await {
            Ok(Ok(summary)) => Some(summary),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "scheduler task panicked");
                Some(RunSummary::default())
            }
            Err(_) => {
                tracing::info!("shutdown wait expired with loops still running");
                None
            }
        }
    }
}
