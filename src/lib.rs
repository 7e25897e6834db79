//! Scoped Cuckoo - bit-level storage for cache admission cuckoo filters
//!
//! Packs fixed-width tags into one contiguous bit region, provides the
//! bucket scans and random kickout a cuckoo filter builds its insert and
//! lookup loops on, and assigns compact ids to cache scopes so they can be
//! embedded inside tags.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

/// Tag table, bit storage and scope encoder
pub mod structures;

// Re-export commonly used items for convenience
pub use crate::core::{Config, Error, Result};
pub use structures::{BitSet, BuiltinBitSet, CuckooTable, ScopeEncoder, SingleCuckooTable, TagPosition};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration and initialize logging
pub fn init() -> Result<Config> {
    let config = Config::load()?;
    crate::core::init_logging(&config.logging);

    tracing::info!("Initializing {} v{}", NAME, VERSION);
    Ok(config)
}
