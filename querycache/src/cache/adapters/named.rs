//! Namespaced cache adapter.
//!
//! Implements the framework's `Cache` capability on top of a shared
//! `CacheEngine`:
//! - Key translation: any `Display` key → its string form
//! - Namespace tagging: every entry is stored under the adapter's id as group
//! - Refresh handling: a pending lookup is cancelled and reported as a miss

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::cache::traits::{Cache, CacheEngine, CacheError, Lookup};

/// Cache adapter bound to one namespace of a shared engine.
///
/// Identity is the namespace: two adapters with the same id compare equal and
/// hash identically, so the framework may treat them as the same cache.
pub struct NamedCache<V> {
    /// Namespace id, also the group every entry is tagged with.
    id: String,

    /// The shared engine.
    engine: Arc<dyn CacheEngine<V>>,

    /// Lock handed to callers; never taken by the adapter itself.
    lock: RwLock<()>,
}

impl<V> NamedCache<V> {
    /// Create a new adapter for the namespace `id`.
    ///
    /// # Arguments
    ///
    /// * `engine` - The shared engine
    /// * `id` - Namespace id, usually the mapper id
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] if `id` is empty.
    pub fn new(engine: Arc<dyn CacheEngine<V>>, id: impl Into<String>) -> Result<Self, CacheError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CacheError::InvalidArgument(
                "Cache instances require an ID".to_string(),
            ));
        }

        Ok(Self {
            id,
            engine,
            lock: RwLock::new(()),
        })
    }

    /// Look up `key`, turning a pending refresh into a miss.
    ///
    /// The adapter never recomputes a stale value: it hands the claim back to
    /// the engine and lets the caller repopulate.
    fn lookup(&self, key: &str) -> Result<Option<V>, CacheError> {
        match self.engine.get_from_cache(key)? {
            Lookup::Hit(value) => Ok(Some(value)),
            Lookup::Miss => Ok(None),
            Lookup::Pending => {
                trace!(cache = %self.id, key = %key, "Refresh pending, treating as miss");
                self.engine.cancel_update(key)?;
                Ok(None)
            }
        }
    }
}

impl<V> Cache<V> for NamedCache<V> {
    fn id(&self) -> &str {
        &self.id
    }

    fn put(&self, key: &dyn fmt::Display, value: V) -> Result<(), CacheError> {
        self.engine
            .put_in_cache(&key.to_string(), value, &[self.id.as_str()])
    }

    fn get(&self, key: &dyn fmt::Display) -> Result<Option<V>, CacheError> {
        self.lookup(&key.to_string())
    }

    fn remove(&self, key: &dyn fmt::Display) -> Result<Option<V>, CacheError> {
        let key = key.to_string();
        let removed = self.lookup(&key)?;

        if removed.is_some() {
            self.engine.flush_entry(&key)?;
        }

        Ok(removed)
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.engine.flush_group(&self.id)
    }

    /// Entry count of the shared engine, not of this namespace alone.
    fn size(&self) -> Result<usize, CacheError> {
        self.engine.size()
    }

    fn read_write_lock(&self) -> &RwLock<()> {
        &self.lock
    }
}

impl<V> PartialEq for NamedCache<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> Eq for NamedCache<V> {}

impl<V> PartialEq<dyn Cache<V> + '_> for NamedCache<V> {
    fn eq(&self, other: &(dyn Cache<V> + '_)) -> bool {
        self.id == other.id()
    }
}

impl<V> Hash for NamedCache<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<V> fmt::Display for NamedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamedCache {{{}}}", self.id)
    }
}

impl<V> fmt::Debug for NamedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedCache")
            .field("id", &self.id)
            .field("engine", &self.engine.name())
            .finish()
    }
}
