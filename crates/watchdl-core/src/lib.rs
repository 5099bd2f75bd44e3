pub mod config;
pub mod logging;

pub mod control;
pub mod error;
pub mod events;
pub mod history;
pub mod monitor;
pub mod probe;
pub mod scheduler;
pub mod source;
pub mod stats;
