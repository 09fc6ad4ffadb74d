//! Configuration for the query cache.
//!
//! [`CacheConfig`] is the in-process configuration passed to
//! `CacheService::start()`. [`ConfigFile`] reads and writes it as an INI file:
//!
//! ```ini
//! [cache]
//! engine = memory
//! max_entries = 10000
//! time_to_live_secs = 0
//! refresh_period_secs = 300
//! ```
//!
//! A value of `0` (or a missing key) disables time-to-live and the refresh
//! window.

mod error;
mod file;

pub use error::ConfigError;
pub use file::ConfigFile;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum number of cached entries.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Which engine backs the caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineKind {
    /// In-memory, group-aware engine.
    #[default]
    Memory,
    /// Engine that stores nothing.
    Null,
}

impl EngineKind {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Memory => "memory",
            EngineKind::Null => "null",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(EngineKind::Memory),
            "null" | "none" => Ok(EngineKind::Null),
            other => Err(ConfigError::InvalidValue {
                key: "engine".to_string(),
                value: other.to_string(),
                reason: "expected 'memory' or 'null'".to_string(),
            }),
        }
    }
}

/// Configuration of the shared cache engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Engine implementation.
    pub engine: EngineKind,

    /// Maximum number of entries held before eviction.
    pub max_entries: u64,

    /// Lifetime after which entries expire. `None` keeps them until evicted.
    pub time_to_live: Option<Duration>,

    /// Age after which entries need a refresh. `None` disables the window.
    pub refresh_period: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Memory,
            max_entries: DEFAULT_MAX_ENTRIES,
            time_to_live: None,
            refresh_period: None,
        }
    }
}

impl CacheConfig {
    /// Set the engine implementation.
    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the entry time-to-live.
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    /// Set the refresh period.
    pub fn with_refresh_period(mut self, period: Duration) -> Self {
        self.refresh_period = Some(period);
        self
    }

    /// Check that the configuration can build an engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine == EngineKind::Memory && self.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_entries".to_string(),
                value: "0".to_string(),
                reason: "the memory engine needs room for at least one entry".to_string(),
            });
        }
        Ok(())
    }
}
