//! querycache - Namespaced second-level query cache
//!
//! This library lets a persistence-mapping framework delegate its query cache
//! to a shared in-process engine. Each mapper namespace gets a
//! [`NamedCache`](cache::NamedCache) adapter; all adapters share one engine
//! started by [`CacheService`](cache::CacheService).

pub mod cache;
pub mod config;

pub use cache::{Cache, CacheEngine, CacheError, CacheService, CacheStats, Lookup, NamedCache};
pub use config::{CacheConfig, ConfigError, ConfigFile, EngineKind};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
