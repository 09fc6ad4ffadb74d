//! Cache engine implementations.
//!
//! Each engine implements the `CacheEngine` trait and manages its own storage,
//! eviction and refresh bookkeeping. Engines are created via
//! `CacheService::start()` from a `CacheConfig`.
//!
//! # Available Engines
//!
//! - [`MemoryCacheEngine`]: In-memory, group-aware engine using moka
//! - [`NullCacheEngine`]: Stores nothing, every lookup misses
//!
//! # Creating Engines
//!
//! ```ignore
//! use querycache::cache::CacheService;
//! use querycache::config::{CacheConfig, EngineKind};
//!
//! let service = CacheService::<String>::start(
//!     CacheConfig::default().with_engine(EngineKind::Memory),
//! )?;
//! ```

mod memory;
mod null;

pub use memory::MemoryCacheEngine;
pub use null::NullCacheEngine;
