//! In-memory cache engine using moka.
//!
//! This engine wraps `moka::sync::Cache` and layers the bookkeeping a shared
//! query cache needs on top of it:
//!
//! - **Groups**: each entry carries the namespaces it was stored under, and a
//!   group index maps a namespace to its keys so a whole namespace can be
//!   flushed without scanning the cache. An eviction listener drops keys from
//!   the index when moka evicts, expires, replaces or invalidates an entry.
//! - **Refresh window**: an entry older than the configured refresh period is
//!   stale. The first reader to see it claims the update and every reader gets
//!   [`Lookup::Pending`] until the claim is cancelled or a new value is stored.
//! - **Statistics**: lock-free counters for hits, misses, pending lookups,
//!   puts and flushes.
//!
//! Capacity eviction and time-to-live expiry are left to moka.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use moka::notification::RemovalCause;
use moka::ops::compute::{CompResult, Op};
use moka::sync::Cache as MokaCache;
use tracing::{debug, info, trace, warn};

use crate::cache::traits::{CacheEngine, CacheError, CacheStats, Lookup};

/// A stored value plus the state the engine tracks for it.
struct EngineEntry<V> {
    value: V,
    groups: Vec<String>,
    /// Unique per store; ties index slots to this entry.
    seq: u64,
    stored_at: Instant,
    /// Set when a reader has claimed the refresh of this entry.
    update_claimed: AtomicBool,
    /// Set by `mark_stale`; forces the refresh path regardless of age.
    stale: AtomicBool,
}

impl<V> EngineEntry<V> {
    fn belongs_to(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Group name to the keys stored under it.
///
/// Each slot records the `seq` of the entry that created it, so removing a
/// superseded entry never drops the slot of the entry that replaced it.
#[derive(Default)]
struct GroupIndex {
    groups: DashMap<String, HashMap<String, u64>>,
}

impl GroupIndex {
    fn insert(&self, group: &str, key: &str, seq: u64) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), seq);
    }

    /// Drop the slots of `key` created with `seq`, pruning emptied groups.
    fn remove(&self, key: &str, groups: &[String], seq: u64) {
        for group in groups {
            self.groups.remove_if_mut(group.as_str(), |_, keys| {
                if keys.get(key) == Some(&seq) {
                    keys.remove(key);
                }
                keys.is_empty()
            });
        }
    }

    fn take(&self, group: &str) -> Option<HashMap<String, u64>> {
        self.groups.remove(group).map(|(_, keys)| keys)
    }

    fn clear(&self) {
        self.groups.clear();
    }

    /// Number of indexed (group, key) pairs.
    fn len(&self) -> usize {
        self.groups.iter().map(|keys| keys.len()).sum()
    }
}

/// In-memory, group-aware cache engine.
///
/// One instance is shared by every adapter in the process. All methods take
/// `&self`; moka's concurrent table and per-entry atomics provide the
/// synchronization.
pub struct MemoryCacheEngine<V> {
    /// The underlying moka cache.
    entries: MokaCache<String, Arc<EngineEntry<V>>>,

    /// Keys by group, shared with the eviction listener.
    ///
    /// A racing flush can leave a slot for a removed key behind;
    /// `flush_group` re-checks membership on the live entry.
    index: Arc<GroupIndex>,

    /// Source of `EngineEntry::seq`.
    next_seq: AtomicU64,

    /// Age after which an entry needs a refresh. `None` disables the window.
    refresh_period: Option<Duration>,

    /// Configured entry limit.
    max_entries: u64,

    /// Cleared by `shutdown`.
    open: AtomicBool,

    hits: AtomicU64,
    misses: AtomicU64,
    pending: AtomicU64,
    puts: AtomicU64,
    flushes: AtomicU64,
}

impl<V> MemoryCacheEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new memory engine.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Maximum number of entries before eviction
    /// * `time_to_live` - Optional lifetime after which entries expire
    /// * `refresh_period` - Optional age after which entries need a refresh
    pub fn new(
        max_entries: u64,
        time_to_live: Option<Duration>,
        refresh_period: Option<Duration>,
    ) -> Self {
        let index = Arc::new(GroupIndex::default());
        let listener_index = Arc::clone(&index);

        let mut builder = MokaCache::builder().max_capacity(max_entries).eviction_listener(
            move |key: Arc<String>, entry: Arc<EngineEntry<V>>, cause: RemovalCause| {
                trace!(key = %key, ?cause, "Cache entry removed");
                listener_index.remove(key.as_str(), &entry.groups, entry.seq);
            },
        );

        if let Some(ttl) = time_to_live {
            builder = builder.time_to_live(ttl);
        }

        Self {
            entries: builder.build(),
            index,
            next_seq: AtomicU64::new(0),
            refresh_period,
            max_entries,
            open: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            pending: AtomicU64::new(0),
            puts: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        }
    }

    /// Maximum number of entries before eviction.
    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }

    /// Whether a reader currently holds the refresh claim for `key`.
    pub fn update_pending(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| entry.update_claimed.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Force the next read of `key` through the refresh path.
    ///
    /// Returns `false` if there is no entry under `key`.
    pub fn mark_stale(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) => {
                entry.stale.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Whether `shutdown` has not been called yet.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.is_open() {
            Ok(())
        } else {
            warn!("Call against a shut down memory cache engine");
            Err(CacheError::Unavailable(
                "memory cache engine has been shut down".to_string(),
            ))
        }
    }

    /// Number of indexed (group, key) pairs.
    pub fn indexed_keys(&self) -> usize {
        self.index.len()
    }

    fn needs_refresh(&self, entry: &EngineEntry<V>) -> bool {
        entry.stale.load(Ordering::Acquire)
            || self
                .refresh_period
                .is_some_and(|period| entry.stored_at.elapsed() >= period)
    }
}

impl<V> CacheEngine<V> for MemoryCacheEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "memory"
    }

    fn put_in_cache(&self, key: &str, value: V, groups: &[&str]) -> Result<(), CacheError> {
        self.ensure_open()?;

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = EngineEntry {
            value,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            seq,
            stored_at: Instant::now(),
            update_claimed: AtomicBool::new(false),
            stale: AtomicBool::new(false),
        };
        let entry = Arc::new(entry);

        // Per-key compute keeps index updates in the same order as stores
        self.entries
            .entry_by_ref(key)
            .and_compute_with(|current| {
                if let Some(previous) = current {
                    let previous = previous.into_value();
                    self.index.remove(key, &previous.groups, previous.seq);
                }
                for group in groups {
                    self.index.insert(group, key, seq);
                }
                Op::Put(entry)
            });

        // A shutdown that ran between the open check and the insert missed
        // this entry.
        if !self.is_open() {
            self.entries.invalidate(key);
            return self.ensure_open();
        }

        self.puts.fetch_add(1, Ordering::Relaxed);
        trace!(key = %key, ?groups, "Stored cache entry");
        Ok(())
    }

    fn get_from_cache(&self, key: &str) -> Result<Lookup<V>, CacheError> {
        self.ensure_open()?;

        let Some(entry) = self.entries.get(key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Lookup::Miss);
        };

        if self.needs_refresh(&entry) {
            if !entry.update_claimed.swap(true, Ordering::AcqRel) {
                debug!(key = %key, "Stale cache entry, update claimed");
            }
            self.pending.fetch_add(1, Ordering::Relaxed);
            return Ok(Lookup::Pending);
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Lookup::Hit(entry.value.clone()))
    }

    fn cancel_update(&self, key: &str) -> Result<(), CacheError> {
        self.ensure_open()?;

        if let Some(entry) = self.entries.get(key) {
            entry.update_claimed.store(false, Ordering::Release);
            trace!(key = %key, "Cancelled cache entry update");
        }
        Ok(())
    }

    fn flush_entry(&self, key: &str) -> Result<(), CacheError> {
        self.ensure_open()?;

        if let Some(entry) = self.entries.remove(key) {
            self.index.remove(key, &entry.groups, entry.seq);
            self.flushes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn flush_group(&self, group: &str) -> Result<(), CacheError> {
        self.ensure_open()?;

        let Some(keys) = self.index.take(group) else {
            return Ok(());
        };

        let mut removed = 0u64;
        for key in keys.keys() {
            // Only remove if the live entry still belongs to this group; the
            // key may have been stored again under another namespace.
            let result = self
                .entries
                .entry_by_ref(key.as_str())
                .and_compute_with(|current| match current {
                    Some(entry) if entry.value().belongs_to(group) => Op::Remove,
                    _ => Op::Nop,
                });
            if let CompResult::Removed(entry) = result {
                // Slots under the entry's other groups
                let entry = entry.into_value();
                self.index.remove(key, &entry.groups, entry.seq);
                removed += 1;
            }
        }

        self.flushes.fetch_add(removed, Ordering::Relaxed);
        debug!(group = %group, indexed = keys.len(), removed, "Flushed cache group");
        Ok(())
    }

    fn size(&self) -> Result<usize, CacheError> {
        self.ensure_open()?;

        // entry_count is eventually consistent until pending tasks run
        self.entries.run_pending_tasks();
        Ok(self.entries.entry_count() as usize)
    }

    fn shutdown(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            self.entries.invalidate_all();
            self.entries.run_pending_tasks();
            self.index.clear();
            info!("Memory cache engine shut down");
        }
    }

    fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            pending: self.pending.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            entries: self.entries.entry_count(),
        }
    }
}
