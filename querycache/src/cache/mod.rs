//! Namespaced query cache.
//!
//! - [`traits`]: the `Cache` capability and the `CacheEngine` seam
//! - [`providers`]: engine implementations (memory, null)
//! - [`adapters`]: `NamedCache`, the namespace-bound adapter
//! - [`CacheService`]: starts the shared engine and hands out adapters

pub mod adapters;
pub mod providers;
mod service;
pub mod traits;

pub use adapters::NamedCache;
pub use providers::{MemoryCacheEngine, NullCacheEngine};
pub use service::CacheService;
pub use traits::{Cache, CacheEngine, CacheError, CacheStats, Lookup};
