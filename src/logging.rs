//! Logging setup for embedding applications.

use anyhow::{Context, Result};
use tracing_subscriber::FmtSubscriber;

/// Install a compact global subscriber at the given level.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(level: tracing::Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}
