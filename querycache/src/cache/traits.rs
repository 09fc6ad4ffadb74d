//! Core traits for the namespaced query cache.
//!
//! Two seams meet here:
//!
//! - [`Cache`] is the capability a persistence framework requires from any
//!   pluggable second-level cache. [`NamedCache`](crate::cache::NamedCache) is
//!   the implementation shipped with this crate.
//! - [`CacheEngine`] is the shared key-value engine behind every adapter. It
//!   owns storage, eviction, expiry, grouping and refresh detection. Engines
//!   are selected at configuration time and started by
//!   [`CacheService`](crate::cache::CacheService).
//!
//! # Example
//!
//! ```ignore
//! use querycache::cache::{Cache, CacheService};
//! use querycache::config::CacheConfig;
//!
//! let service = CacheService::<String>::start(CacheConfig::default())?;
//! let orders = service.named_cache("orders")?;
//!
//! orders.put(&"1", "Order#1".to_string())?;
//! assert_eq!(orders.get(&"1")?, Some("Order#1".to_string()));
//! ```

use std::fmt;

use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// A cache was constructed with a missing or empty id.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The shared engine was shut down or could not be built.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of an engine lookup.
///
/// `Pending` means the entry exists but is stale and a caller has claimed
/// responsibility for recomputing it. Whoever receives `Pending` must either
/// supply a replacement with [`CacheEngine::put_in_cache`] or give up the
/// claim with [`CacheEngine::cancel_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Entry present and fresh.
    Hit(V),
    /// No entry under this key.
    Miss,
    /// Entry present but awaiting a refresh.
    Pending,
}

impl<V> Lookup<V> {
    /// Returns the value of a hit, `None` otherwise.
    pub fn into_hit(self) -> Option<V> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Pending => None,
        }
    }
}

/// Point-in-time engine statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a fresh value.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Lookups that found a stale entry.
    pub pending: u64,
    /// Values stored.
    pub puts: u64,
    /// Entries removed by explicit or group flushes.
    pub flushes: u64,
    /// Entries currently held, across all groups.
    pub entries: u64,
}

impl CacheStats {
    /// Fraction of lookups that were hits, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.pending;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} hits, {} misses, {} pending ({:.1}% hit rate), {} puts, {} flushes",
            self.entries,
            self.hits,
            self.misses,
            self.pending,
            self.hit_rate() * 100.0,
            self.puts,
            self.flushes
        )
    }
}

/// Shared, string-keyed engine behind every [`Cache`] adapter.
///
/// One engine instance is shared by all adapters regardless of namespace.
/// Groups tag entries for bulk invalidation; an adapter always tags with its
/// own id.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` and linearize concurrent calls on the
/// same key. A [`Lookup::Pending`] must only be reported for a key whose
/// update has been claimed.
pub trait CacheEngine<V>: Send + Sync {
    /// Short identifier of the implementation (e.g. `"memory"`).
    fn name(&self) -> &'static str;

    /// Store `value` under `key`, tagged with `groups`.
    ///
    /// Replaces any existing entry and completes a pending update on the key.
    fn put_in_cache(&self, key: &str, value: V, groups: &[&str]) -> Result<(), CacheError>;

    /// Look up `key`.
    fn get_from_cache(&self, key: &str) -> Result<Lookup<V>, CacheError>;

    /// Give up a claimed update on `key` without supplying a value.
    fn cancel_update(&self, key: &str) -> Result<(), CacheError>;

    /// Remove the single entry under `key`.
    fn flush_entry(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every entry tagged with `group`.
    fn flush_group(&self, group: &str) -> Result<(), CacheError>;

    /// Number of entries held, across all groups.
    fn size(&self) -> Result<usize, CacheError>;

    /// Drop all entries and refuse further calls with
    /// [`CacheError::Unavailable`]. Engines without state may ignore it.
    fn shutdown(&self) {}

    /// Snapshot of the engine counters.
    fn stats(&self) -> CacheStats;
}

/// Cache capability required by the persistence framework.
///
/// Keys are stringified with [`fmt::Display`] before they reach the engine,
/// so any framework key type with a stable textual form can be used.
///
/// # Locking
///
/// [`Cache::read_write_lock`] hands out a lock owned by the cache instance.
/// Implementations do not take it for their own single-key operations; it
/// exists for callers guarding read-compute-write sequences that span several
/// calls.
pub trait Cache<V>: Send + Sync {
    /// Namespace id of this cache.
    fn id(&self) -> &str;

    /// Store a value.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the engine is gone.
    fn put(&self, key: &dyn fmt::Display, value: V) -> Result<(), CacheError>;

    /// Fetch a value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on a hit
    /// - `Ok(None)` when absent or awaiting refresh
    /// - `Err(_)` if the engine is gone
    fn get(&self, key: &dyn fmt::Display) -> Result<Option<V>, CacheError>;

    /// Remove a value, returning it if one was present.
    fn remove(&self, key: &dyn fmt::Display) -> Result<Option<V>, CacheError>;

    /// Remove every value stored through this cache's namespace.
    fn clear(&self) -> Result<(), CacheError>;

    /// Number of entries held by the backing store.
    fn size(&self) -> Result<usize, CacheError>;

    /// Lock reserved for the caller's multi-step sequences.
    fn read_write_lock(&self) -> &RwLock<()>;
}

/// Caches are identified by namespace: two caches with the same id are
/// interchangeable, whatever their concrete type.
impl<V> PartialEq for dyn Cache<V> + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
