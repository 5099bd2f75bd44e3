//! `watchdl clear-history` – wipe the ledger after confirmation.

use anyhow::Result;
use watchdl_core::history::HistoryLedger;

pub fn run_clear_history(ledger: &mut HistoryLedger, yes: bool) -> Result<()> {
    let count = ledger.list().len();
    if count == 0 {
        println!("History is already empty.");
        return Ok(());
    }
    if !yes {
        println!("Would remove {} record(s); re-run with --yes to confirm.", count);
        return Ok(());
    }
    ledger.clear()?;
    println!("Removed {} record(s).", count);
    Ok(())
}
