//! Error taxonomy for the orchestration core.
//!
//! Collaborator failures (`FetchError`, `WriteError`, `ResolutionError`) are
//! absorbed at the monitor-loop boundary: they end one entity's cycle and are
//! recorded in the history ledger, but never cancel sibling loops.
//! `PersistError` is surfaced to the ledger caller without rolling back the
//! in-memory mutation.

use thiserror::Error;

/// Remote fetch failed (network error or malformed payload).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Writing fetched items to local storage failed.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("write failed: {0}")]
    Other(String),
}

/// The destination directory for an entity could not be prepared.
#[derive(Debug, Error)]
#[error("cannot prepare destination for {entity_id}: {reason}")]
pub struct ResolutionError {
    pub entity_id: String,
    pub reason: String,
}

/// The history ledger could not be written through to disk. Memory and disk
/// stay inconsistent until the next successful write (last-writer-wins).
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("history write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Any failure inside one entity's download cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The source returned nothing before a single item was seen.
    #[error("no items returned by the content source")]
    EmptyFetch,
}
