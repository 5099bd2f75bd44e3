//! Cooperative cancellation for the scheduler and its monitor loops.
//!
//! A single `CancelToken` is cloned into every entity loop; the loops check
//! it at each page boundary and at each one-second wait tick. Nothing is
//! force-killed: setting the token winds all loops down within one page
//! fetch or one wait tick, whichever they are in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation token passed down the scheduler call chain.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; observed by all clones.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
