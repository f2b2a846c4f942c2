//! Tracing subscriber setup for the binary
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! whoever embeds it.

use tracing_subscriber::EnvFilter;

use crate::core::error::{CoreError, CoreResult};

/// Install a fmt subscriber writing to stderr
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init_tracing(default_filter: &str) -> CoreResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| CoreError::Logging { message: e.to_string() })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CoreError::Logging { message: e.to_string() })
}
