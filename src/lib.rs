//! tabsh - line-oriented command interpreter over CSV tables, with a small task tracker.

pub mod config;
pub mod export;
pub mod project;
pub mod query;
pub mod shell;
pub mod telemetry;
pub mod types;

// Re-export main types
pub use config::Config;
pub use shell::{run, Command, Outcome, Session};
pub use types::{Cell, CommandError, Result, Table};
