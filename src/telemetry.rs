//! Tracing setup and command spans.
//!
//! Log output goes to stderr so stdout carries only command results.
//!
//! **Span naming**: `command`, with attributes
//! - `verb`: the command verb (`FILTER`, `JOIN`, ...)
//! - `seq`: position of the command in the session

use tracing::{span, Level, Span};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `directives` uses `EnvFilter` syntax (`warn`, `tabsh=debug`, ...).
///
/// # Errors
///
/// Fails if the directives do not parse or a subscriber is already set
pub fn init_tracing(directives: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(directives)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;
    Ok(())
}

/// Span wrapping one dispatched command.
///
/// # Example
///
/// ```rust,ignore
/// let span = command_span("FILTER", 3);
/// let _guard = span.enter();
/// ```
pub fn command_span(verb: &str, seq: usize) -> Span {
    span!(Level::INFO, "command", verb = verb, seq = seq)
}
