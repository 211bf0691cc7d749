//! Structured logging via `tracing`.
//!
//! Call [`init_logging`] once at startup. Events go to stderr so stdout stays
//! free for answers. `RUST_LOG` overrides the configured level, e.g.
//! `RUST_LOG=quire_core=debug`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("logging already initialized")]
    AlreadyInitialized,
    #[error("invalid log level: {0}")]
    InvalidLevel(String),
}

/// Install the global subscriber. A second call returns [`LogError::AlreadyInitialized`].
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|_| LogError::InvalidLevel(config.level.clone()))?,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|_| LogError::AlreadyInitialized)
}
