use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/watchdl/config.toml`.
///
/// Constructed explicitly and passed into the scheduler; there is no
/// process-wide configuration singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdlConfig {
    /// Maximum entity loops running at once.
    pub max_concurrent_tasks: usize,
    /// Items requested per page from the content source.
    pub page_size: usize,
    /// Default wait between monitor cycles, in minutes.
    pub monitor_interval_mins: u64,
    /// Optional cap on items fetched per entity per cycle (None = no cap).
    #[serde(default)]
    pub max_items: Option<u64>,
    /// Optional download directory override (None = resolver decides).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

impl Default for WatchdlConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 3,
            page_size: 20,
            monitor_interval_mins: 60,
            max_items: None,
            download_dir: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("watchdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WatchdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WatchdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: WatchdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
