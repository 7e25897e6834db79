//! Core system foundations
//!
//! Error handling, configuration and logging shared by the data structures.

pub mod error;
pub mod config;
pub mod logging;

// Re-export commonly used items
pub use error::{Error, Result};
pub use config::{Config, LoggingConfig, ScopeConfig, TableConfig};
pub use logging::init_logging;
