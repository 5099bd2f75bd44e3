//! Durable per-entity download history.
//!
//! One record per entity id, upserted after every cycle and written through
//! to a single JSON file, so a crash loses at most the in-flight cycle.
//! Mutations are read-modify-persist over the whole record set; concurrent
//! entity loops must serialize access (the scheduler wraps the ledger in a
//! `tokio::sync::Mutex`).

mod persist;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PersistError;

/// Gap after which a success upsert counts as a new download session.
///
/// Repeated upserts for the same entity within this window (or with no
/// status change to success) collapse into one counted session, so retries
/// and per-page updates don't inflate the download count. Policy constant
/// carried over from the original heuristic, not a law of nature.
pub const SESSION_GAP_SECS: i64 = 30 * 60;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamps stored as `"YYYY-MM-DD HH:MM:SS"` strings in the ledger file.
mod ledger_time {
    use super::TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Last recorded status of one entity's downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Success,
    Failure,
    InProgress,
}

impl DownloadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadStatus::Success => "success",
            DownloadStatus::Failure => "failure",
            DownloadStatus::InProgress => "in progress",
        }
    }
}

/// One row per entity, uniquely keyed by `entity_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub entity_id: String,
    pub display_name: String,
    #[serde(with = "ledger_time")]
    pub first_seen: NaiveDateTime,
    #[serde(with = "ledger_time")]
    pub last_seen: NaiveDateTime,
    /// Completed download sessions, collapsed by the session heuristic.
    pub download_count: u32,
    /// Items newly written across all sessions.
    #[serde(default)]
    pub total_new_items: u64,
    /// Newly-written count of the most recent cycle that wrote anything.
    #[serde(default)]
    pub last_new_items: u64,
    pub status: DownloadStatus,
}

/// In-memory ledger plus its on-disk JSON file.
#[derive(Debug)]
pub struct HistoryLedger {
    path: PathBuf,
    records: Vec<HistoryRecord>,
}

impl HistoryLedger {
    /// Record a completed (or failed) cycle for `entity_id` using the local
    /// clock. See [`HistoryLedger::upsert_at`].
    pub fn upsert(
        &mut self,
        entity_id: &str,
        display_name: Option<&str>,
        status: DownloadStatus,
        new_items: u64,
    ) -> Result<(), PersistError> {
        self.upsert_at(entity_id, display_name, status, new_items, Local::now().naive_local())
    }

    /// Upsert with an explicit clock value.
    ///
    /// Existing record: refresh display name (non-empty values only) and
    /// `last_seen`; a success increments `download_count` only when it opens
    /// a new session (previous status not success, calendar day changed, or
    /// gap above [`SESSION_GAP_SECS`]); a positive `new_items` updates the
    /// last/cumulative counters; status is always overwritten. Absent
    /// record: created with `download_count` 1. The full record set is
    /// persisted before returning; a failed persist leaves the in-memory
    /// mutation in place (last-writer-wins, reconciled by the next
    /// successful write).
    pub fn upsert_at(
        &mut self,
        entity_id: &str,
        display_name: Option<&str>,
        status: DownloadStatus,
        new_items: u64,
        now: NaiveDateTime,
    ) -> Result<(), PersistError> {
        if entity_id.is_empty() {
            tracing::warn!("ignoring history upsert with empty entity id");
            return Ok(());
        }

        if let Some(record) = self.records.iter_mut().find(|r| r.entity_id == entity_id) {
            if let Some(name) = display_name.filter(|n| !n.is_empty()) {
                record.display_name = name.to_string();
            }
            let previous_seen = record.last_seen;
            let previous_status = record.status;
            record.last_seen = now;

            if status == DownloadStatus::Success {
                let gap_secs = (now - previous_seen).num_seconds();
                let new_session = previous_status != DownloadStatus::Success
                    || previous_seen.date() != now.date()
                    || gap_secs > SESSION_GAP_SECS;
                if new_session {
                    record.download_count += 1;
                }
            }

            if new_items > 0 {
                record.last_new_items = new_items;
                record.total_new_items += new_items;
            }
            record.status = status;
        } else {
            let mut record = HistoryRecord {
                entity_id: entity_id.to_string(),
                display_name: display_name
                    .filter(|n| !n.is_empty())
                    .unwrap_or("unknown")
                    .to_string(),
                first_seen: now,
                last_seen: now,
                download_count: 1,
                total_new_items: 0,
                last_new_items: 0,
                status,
            };
            if new_items > 0 {
                record.last_new_items = new_items;
                record.total_new_items = new_items;
            }
            self.records.push(record);
        }

        self.save()
    }

    pub fn get(&self, entity_id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.entity_id == entity_id)
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Wipe all records with a single persist.
    pub fn clear(&mut self) -> Result<(), PersistError> {
        self.records.clear();
        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
