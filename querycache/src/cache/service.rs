//! Shared engine lifecycle.
//!
//! `CacheService` owns the one engine a process shares between all of its
//! namespaced caches. The host application starts it during startup, hands
//! out adapters from it, and shuts it down with the rest of the application.

use std::sync::Arc;

use tracing::info;

use crate::cache::adapters::NamedCache;
use crate::cache::providers::{MemoryCacheEngine, NullCacheEngine};
use crate::cache::traits::{CacheEngine, CacheError, CacheStats};
use crate::config::{CacheConfig, EngineKind};

/// Running cache engine plus the configuration it was built from.
///
/// # Example
///
/// ```ignore
/// use querycache::cache::{Cache, CacheService};
/// use querycache::config::CacheConfig;
///
/// let service = CacheService::<String>::start(CacheConfig::default())?;
///
/// let orders = service.named_cache("orders")?;
/// let users = service.named_cache("users")?;
/// orders.put(&"1", "Order#1".to_string())?;
///
/// // Later: graceful shutdown
/// service.shutdown();
/// ```
pub struct CacheService<V> {
    engine: Arc<dyn CacheEngine<V>>,
    config: CacheConfig,
}

impl<V> CacheService<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Build the engine selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the configuration cannot build
    /// an engine.
    pub fn start(config: CacheConfig) -> Result<Self, CacheError> {
        config
            .validate()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        let engine: Arc<dyn CacheEngine<V>> = match config.engine {
            EngineKind::Memory => Arc::new(MemoryCacheEngine::new(
                config.max_entries,
                config.time_to_live,
                config.refresh_period,
            )),
            EngineKind::Null => Arc::new(NullCacheEngine::new()),
        };

        info!(
            engine = %config.engine,
            max_entries = config.max_entries,
            time_to_live = ?config.time_to_live,
            refresh_period = ?config.refresh_period,
            "Cache service started"
        );

        Ok(Self { engine, config })
    }

    /// Wrap an engine built elsewhere.
    pub fn with_engine(engine: Arc<dyn CacheEngine<V>>, config: CacheConfig) -> Self {
        Self { engine, config }
    }

    /// Create an adapter bound to the namespace `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] if `id` is empty.
    pub fn named_cache(&self, id: impl Into<String>) -> Result<NamedCache<V>, CacheError> {
        NamedCache::new(Arc::clone(&self.engine), id)
    }

    /// The shared engine.
    pub fn engine(&self) -> Arc<dyn CacheEngine<V>> {
        Arc::clone(&self.engine)
    }

    /// Configuration the service was started with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Engine counters.
    pub fn stats(&self) -> CacheStats {
        self.engine.stats()
    }

    /// Shut the engine down.
    ///
    /// Adapters handed out earlier stay alive but every call on them returns
    /// [`CacheError::Unavailable`] (engines without state keep accepting).
    pub fn shutdown(&self) {
        self.engine.shutdown();
        info!(engine = self.engine.name(), "Cache service shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::traits::Cache;
    use std::time::Duration;

    #[test]
    fn test_service_start_memory() {
        let service = CacheService::<String>::start(CacheConfig::default()).unwrap();
        assert_eq!(service.engine().name(), "memory");
        assert_eq!(service.config().engine, EngineKind::Memory);
    }

    #[test]
    fn test_service_start_null() {
        let service =
            CacheService::<String>::start(CacheConfig::default().with_engine(EngineKind::Null))
                .unwrap();
        let cache = service.named_cache("orders").unwrap();

        cache.put(&"1", "Order#1".to_string()).unwrap();
        assert_eq!(cache.get(&"1").unwrap(), None);
        assert_eq!(service.engine().name(), "null");
    }

    #[test]
    fn test_service_start_rejects_invalid_config() {
        let result = CacheService::<String>::start(CacheConfig::default().with_max_entries(0));
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[test]
    fn test_service_adapters_share_engine() {
        let service = CacheService::<String>::start(CacheConfig::default()).unwrap();
        let orders = service.named_cache("orders").unwrap();
        let users = service.named_cache("users").unwrap();

        orders.put(&"1", "Order#1".to_string()).unwrap();
        users.put(&"1", "User#1".to_string()).unwrap();

        // Keys are not namespaced: the second put replaced the first
        assert_eq!(orders.get(&"1").unwrap(), Some("User#1".to_string()));
        assert_eq!(service.stats().puts, 2);
    }

    #[test]
    fn test_service_named_cache_rejects_empty_id() {
        let service = CacheService::<String>::start(CacheConfig::default()).unwrap();
        assert!(matches!(
            service.named_cache(""),
            Err(CacheError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_service_shutdown_makes_adapters_unavailable() {
        let service = CacheService::<String>::start(
            CacheConfig::default().with_refresh_period(Duration::from_secs(60)),
        )
        .unwrap();
        let cache = service.named_cache("orders").unwrap();
        cache.put(&"1", "Order#1".to_string()).unwrap();

        service.shutdown();

        assert!(matches!(cache.get(&"1"), Err(CacheError::Unavailable(_))));
        assert!(matches!(cache.size(), Err(CacheError::Unavailable(_))));
    }

    #[test]
    fn test_service_with_engine() {
        let engine: Arc<dyn CacheEngine<u64>> = Arc::new(NullCacheEngine::new());
        let service = CacheService::with_engine(engine, CacheConfig::default());

        let cache = service.named_cache("numbers").unwrap();
        assert_eq!(cache.to_string(), "NamedCache {numbers}");
    }
}
