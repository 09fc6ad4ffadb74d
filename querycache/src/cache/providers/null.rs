//! Null cache engine.
//!
//! Accepts every call and stores nothing. Selecting it in configuration
//! disables query caching without changing any caller.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::traits::{CacheEngine, CacheError, CacheStats, Lookup};

/// Engine that never holds an entry.
pub struct NullCacheEngine<V> {
    puts: AtomicU64,
    misses: AtomicU64,
    _value: PhantomData<fn() -> V>,
}

impl<V> NullCacheEngine<V> {
    /// Create a new null engine.
    pub fn new() -> Self {
        Self {
            puts: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            _value: PhantomData,
        }
    }
}

impl<V> Default for NullCacheEngine<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheEngine<V> for NullCacheEngine<V> {
    fn name(&self) -> &'static str {
        "null"
    }

    fn put_in_cache(&self, _key: &str, _value: V, _groups: &[&str]) -> Result<(), CacheError> {
        self.puts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn get_from_cache(&self, _key: &str) -> Result<Lookup<V>, CacheError> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(Lookup::Miss)
    }

    fn cancel_update(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    fn flush_entry(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    fn flush_group(&self, _group: &str) -> Result<(), CacheError> {
        Ok(())
    }

    fn size(&self) -> Result<usize, CacheError> {
        Ok(0)
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            puts: self.puts.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_engine_never_hits() {
        let engine = NullCacheEngine::<String>::new();

        engine.put_in_cache("k1", "v1".to_string(), &["a"]).unwrap();

        assert_eq!(engine.get_from_cache("k1").unwrap(), Lookup::Miss);
        assert_eq!(engine.size().unwrap(), 0);
        assert_eq!(engine.name(), "null");
    }

    #[test]
    fn test_null_engine_flushes_succeed() {
        let engine = NullCacheEngine::<u32>::default();

        engine.flush_entry("k1").unwrap();
        engine.flush_group("a").unwrap();
        engine.cancel_update("k1").unwrap();
    }

    #[test]
    fn test_null_engine_stats() {
        let engine = NullCacheEngine::<u32>::new();

        engine.put_in_cache("k1", 1, &["a"]).unwrap();
        engine.get_from_cache("k1").unwrap();
        engine.get_from_cache("k2").unwrap();

        let stats = engine.stats();
        assert_eq!(stats.puts, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 0);
    }
}
