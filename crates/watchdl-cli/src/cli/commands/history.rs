//! `watchdl history` – print the download history ledger.

use anyhow::Result;
use watchdl_core::history::HistoryLedger;

pub fn run_history(ledger: &HistoryLedger) -> Result<()> {
    let records = ledger.list();
    if records.is_empty() {
        println!("No download history.");
        return Ok(());
    }

    println!(
        "{:<24} {:<20} {:>8} {:>10} {:<12} {}",
        "ENTITY", "NAME", "SESSIONS", "NEW ITEMS", "STATUS", "LAST SEEN"
    );
    for rec in records {
        println!(
            "{:<24} {:<20} {:>8} {:>10} {:<12} {}",
            rec.entity_id,
            rec.display_name,
            rec.download_count,
            rec.total_new_items,
            rec.status.as_str(),
            rec.last_seen.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    Ok(())
}
