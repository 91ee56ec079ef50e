//! Structured logging setup using the `tracing` crate.

use crate::error::SyncError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initialize the global tracing subscriber.
///
/// The filter is taken from `DRIFTSYNC_LOG`, then `RUST_LOG`, then
/// `default_level`. Fails if a subscriber is already installed.
pub fn init_logging(default_level: &str) -> Result<(), SyncError> {
    let filter = EnvFilter::try_from_env("DRIFTSYNC_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| SyncError::Config(format!("failed to initialize logging: {e}")))?;

    Ok(())
}
