//! `watchdl config` – show the effective configuration.

use anyhow::Result;
use watchdl_core::config::{self, WatchdlConfig};

pub fn run_config(cfg: &WatchdlConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    println!("max_concurrent_tasks: {}", cfg.max_concurrent_tasks);
    println!("page_size: {}", cfg.page_size);
    println!("monitor_interval_mins: {}", cfg.monitor_interval_mins);
    match cfg.max_items {
        Some(cap) => println!("max_items: {}", cap),
        None => println!("max_items: (no cap)"),
    }
    match &cfg.download_dir {
        Some(dir) => println!("download_dir: {}", dir.display()),
        None => println!("download_dir: (resolver default)"),
    }
    Ok(())
}
