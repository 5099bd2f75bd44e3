//! Load/save the ledger file (JSON array under the XDG state dir).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{HistoryLedger, HistoryRecord};
use crate::error::PersistError;

impl HistoryLedger {
    /// Default ledger file: `~/.local/state/watchdl/download_history.json`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("watchdl")?;
        Ok(xdg_dirs.get_state_home().join("download_history.json"))
    }

    /// Open the ledger at `path`. A missing or unreadable file yields an
    /// empty ledger, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match load_records(&path) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("could not load history from {}: {:#}", path.display(), e);
                Vec::new()
            }
        };
        Self { path, records }
    }

    /// Write the full record set through to disk (creates parent dirs).
    pub(super) fn save(&self) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn load_records(path: &Path) -> Result<Vec<HistoryRecord>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("read history: {}", path.display())),
    };
    serde_json::from_slice(&bytes).with_context(|| format!("parse history: {}", path.display()))
}
