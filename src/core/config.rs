//! Configuration management for the scoped cuckoo table
//!
//! Table shape, scope width and logging settings, loaded from a TOML file
//! with environment variable overrides.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default configuration file looked up by [`Config::load`]
pub const CONFIG_FILE: &str = "scoped-cuckoo.toml";

/// Widest tag or scope id the table can store
pub const MAX_FIELD_BITS: usize = 32;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Cuckoo table shape
    #[serde(default)]
    pub table: TableConfig,

    /// Scope encoder configuration
    #[serde(default)]
    pub scope: ScopeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cuckoo table shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Number of buckets
    pub num_buckets: usize,

    /// Slots per bucket
    pub tags_per_bucket: usize,

    /// Width of a single tag in bits
    pub bits_per_tag: usize,
}

/// Scope encoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Bits reserved for the scope id inside each tag
    pub bits_per_scope: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Use ANSI colours in log output
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            num_buckets: 1 << 16,
            tags_per_bucket: 4,
            bits_per_tag: 16,
        }
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self { bits_per_scope: 8 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: default_ansi(),
        }
    }
}

fn default_ansi() -> bool {
    true
}

impl TableConfig {
    /// Total number of bits the backing storage must hold, or `None` on overflow
    pub fn total_bits(&self) -> Option<usize> {
        self.num_buckets
            .checked_mul(self.tags_per_bucket)?
            .checked_mul(self.bits_per_tag)
    }

    /// Total number of slots in the table
    pub fn size_in_tags(&self) -> usize {
        self.num_buckets.saturating_mul(self.tags_per_bucket)
    }

    /// Check the shape is constructible
    pub fn validate(&self) -> Result<()> {
        if self.num_buckets == 0 || self.tags_per_bucket == 0 {
            return Err(Error::invalid_shape(format!(
                "table needs at least one bucket and one slot per bucket (got {} x {})",
                self.num_buckets, self.tags_per_bucket
            )));
        }
        if self.bits_per_tag == 0 || self.bits_per_tag > MAX_FIELD_BITS {
            return Err(Error::invalid_shape(format!(
                "bits_per_tag must be in 1..={}, got {}",
                MAX_FIELD_BITS, self.bits_per_tag
            )));
        }
        if self.total_bits().is_none() {
            return Err(Error::invalid_shape("table bit count overflows usize"));
        }
        Ok(())
    }
}

impl ScopeConfig {
    /// Check the scope width is representable
    pub fn validate(&self) -> Result<()> {
        if self.bits_per_scope == 0 || self.bits_per_scope > MAX_FIELD_BITS {
            return Err(Error::invalid_shape(format!(
                "bits_per_scope must be in 1..={}, got {}",
                MAX_FIELD_BITS, self.bits_per_scope
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from environment variables and config file
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from `path` (defaults if it does not exist),
    /// then apply environment overrides and validate
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let mut config = Self::from_optional_file(path)?;

        // Override with environment variables
        config.apply_env_overrides()?;

        config.validate()?;

        Ok(config)
    }

    /// Read a config file, falling back to defaults only when it is missing
    fn from_optional_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(Error::config(format!("Failed to read config file: {}", e))),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        use std::env;

        if let Ok(v) = env::var("SC_NUM_BUCKETS") {
            self.table.num_buckets = v.parse()
                .map_err(|e| Error::config(format!("Invalid bucket count: {}", e)))?;
        }

        if let Ok(v) = env::var("SC_TAGS_PER_BUCKET") {
            self.table.tags_per_bucket = v.parse()
                .map_err(|e| Error::config(format!("Invalid tags per bucket: {}", e)))?;
        }

        if let Ok(v) = env::var("SC_BITS_PER_TAG") {
            self.table.bits_per_tag = v.parse()
                .map_err(|e| Error::config(format!("Invalid bits per tag: {}", e)))?;
        }

        if let Ok(v) = env::var("SC_BITS_PER_SCOPE") {
            self.scope.bits_per_scope = v.parse()
                .map_err(|e| Error::config(format!("Invalid bits per scope: {}", e)))?;
        }

        if let Ok(level) = env::var("SC_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;
        self.scope.validate()?;

        // Scope ids live inside tags, leaving at least one fingerprint bit
        if self.scope.bits_per_scope >= self.table.bits_per_tag {
            return Err(Error::config(format!(
                "bits_per_scope ({}) must be smaller than bits_per_tag ({})",
                self.scope.bits_per_scope, self.table.bits_per_tag
            )));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {},
            _ => return Err(Error::config("Invalid log level")),
        }

        Ok(())
    }
}
