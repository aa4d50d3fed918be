//! Logging and tracing initialization.
//!
//! The crate mixes `log` macros (database boundary) with `tracing` spans
//! (render pipeline); the `LogTracer` bridge routes the former into the
//! latter so one subscriber sees everything.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum InitError {
    #[error("Failed to install log bridge: {0}")]
    LogBridge(#[from] log::SetLoggerError),

    #[error("Failed to set tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs the global subscriber. Filter comes from `RUST_LOG`,
/// defaulting to `info`. Call once at startup; a second call errors.
pub fn init() -> Result<(), InitError> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
