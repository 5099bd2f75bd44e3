//! Single-shot update probe: has this entity posted since we last looked?
//!
//! Fetches exactly one page of one item and compares its creation time with
//! the last recorded ledger timestamp. Every failure mode resolves to
//! `false`: the probe only feeds a UI hint, so absence of evidence must not
//! claim an update. The ledger is never touched.

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::source::ContentSource;

/// Result of one update probe. Ephemeral; consumed immediately by the caller.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub entity_id: String,
    pub has_updates: bool,
    pub checked_at: NaiveDateTime,
}

/// Check whether `entity_id` has an item newer than `last_seen`.
pub async fn check_for_updates(
    source: &dyn ContentSource,
    entity_id: &str,
    last_seen: Option<NaiveDateTime>,
) -> ProbeOutcome {
    let has_updates = probe(source, entity_id, last_seen).await;
    ProbeOutcome {
        entity_id: entity_id.to_string(),
        has_updates,
        checked_at: Local::now().naive_local(),
    }
}

async fn probe(
    source: &dyn ContentSource,
    entity_id: &str,
    last_seen: Option<NaiveDateTime>,
) -> bool {
    let Some(last_seen) = last_seen else {
        return false;
    };
    // Ledger timestamps are local wall-clock; skip ambiguous DST instants.
    let Some(last_ts) = Local
        .from_local_datetime(&last_seen)
        .single()
        .map(|t| t.timestamp())
    else {
        return false;
    };

    let page = match source.fetch_page(entity_id, 0, 1).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(entity_id, error = %e, "update probe fetch failed");
            return false;
        }
    };
    let Some(latest) = page.items.first() else {
        tracing::debug!(entity_id, "update probe: no items returned");
        return false;
    };

    latest.created_at > last_ts
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::FetchError;
    use crate::source::{ContentItem, Page};

    const BASE: i64 = 1_700_000_000;

    struct OneItemSource {
        created_at: Option<i64>,
        fail: bool,
        requested_sizes: AtomicUsize,
    }

    impl OneItemSource {
        fn with_item(created_at: i64) -> Self {
            Self {
                created_at: Some(created_at),
                fail: false,
                requested_sizes: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                created_at: None,
                fail: false,
                requested_sizes: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                created_at: None,
                fail: true,
                requested_sizes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentSource for OneItemSource {
        async fn fetch_page(
            &self,
            _entity_id: &str,
            _cursor: u64,
            page_size: usize,
        ) -> Result<Page, FetchError> {
            self.requested_sizes.store(page_size, Ordering::Relaxed);
            if self.fail {
                return Err(FetchError::Request("connection refused".into()));
            }
            let items = self
                .created_at
                .map(|ts| ContentItem {
                    id: "item-1".into(),
                    desc: None,
                    created_at: ts,
                })
                .into_iter()
                .collect();
            Ok(Page {
                items,
                next_cursor: 0,
                exhausted: true,
            })
        }
    }

    fn last_seen_at(epoch: i64) -> NaiveDateTime {
        Local.timestamp_opt(epoch, 0).unwrap().naive_local()
    }

    #[tokio::test]
    async fn newer_item_reports_update() {
        let source = OneItemSource::with_item(BASE + 1);
        let outcome = check_for_updates(&source, "u1", Some(last_seen_at(BASE))).await;
        assert!(outcome.has_updates);
        assert_eq!(outcome.entity_id, "u1");
        // Exactly one item is requested.
        assert_eq!(source.requested_sizes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn equal_timestamp_is_not_an_update() {
        let source = OneItemSource::with_item(BASE);
        let outcome = check_for_updates(&source, "u1", Some(last_seen_at(BASE))).await;
        assert!(!outcome.has_updates);
    }

    #[tokio::test]
    async fn fetch_error_resolves_to_false() {
        let source = OneItemSource::failing();
        let outcome = check_for_updates(&source, "u1", Some(last_seen_at(BASE))).await;
        assert!(!outcome.has_updates);
    }

    #[tokio::test]
    async fn empty_page_resolves_to_false() {
        let source = OneItemSource::empty();
        let outcome = check_for_updates(&source, "u1", Some(last_seen_at(BASE))).await;
        assert!(!outcome.has_updates);
    }

    #[tokio::test]
    async fn missing_last_seen_resolves_to_false() {
        let source = OneItemSource::with_item(BASE + 100);
        let outcome = check_for_updates(&source, "u1", None).await;
        assert!(!outcome.has_updates);
    }
}
