//! Logging setup
//!
//! Structured logging goes through the tracing crate. The subscriber honours
//! `RUST_LOG` when set and otherwise falls back to the configured level.

use crate::core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// Returns `false` when a global subscriber was already installed, which
/// happens when the host application or another test set one up first.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .is_ok()
}
