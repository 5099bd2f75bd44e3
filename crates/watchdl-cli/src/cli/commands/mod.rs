mod clear_history;
mod config;
mod history;

pub use clear_history::run_clear_history;
pub use config::run_config;
pub use history::run_history;
