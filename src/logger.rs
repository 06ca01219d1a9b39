//! Debug logging support
//!
//! When `--debug` is passed, every module's `tracing::debug!` events are
//! rendered to standard error. Without it no subscriber is installed and
//! the events are discarded.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Initialize the debug diagnostic stream
pub fn init(debug_enabled: bool) -> Result<()> {
    if !debug_enabled {
        return Ok(());
    }

    let subscriber = registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(EnvFilter::new("repver=debug"));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))?;

    Ok(())
}
