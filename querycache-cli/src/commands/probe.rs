//! Probe command - exercise a namespaced cache end to end.
//!
//! Starts a service from the configuration, binds an adapter to the
//! requested namespace and runs one round of the adapter contract:
//!
//! 1. `put` then `get` must hit
//! 2. `remove` must return the value and the next `get` must miss
//! 3. `clear` must drop every entry of the namespace

use std::path::Path;

use querycache::{Cache, CacheConfig, CacheService, CacheStats, ConfigFile};
use serde_json::json;
use tracing::debug;

use crate::error::CliError;

const PROBE_KEY: &str = "probe-1";
const PROBE_VALUE: &str = "probe value";
const CLEAR_KEYS: usize = 3;

/// Outcome of one probe round.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub namespace: String,
    pub engine: &'static str,
    pub hit_after_put: bool,
    pub removed: bool,
    pub miss_after_remove: bool,
    pub cleared: bool,
    pub stats: CacheStats,
}

impl ProbeReport {
    /// Whether the engine behaved like a storing engine.
    pub fn all_passed(&self) -> bool {
        self.hit_after_put && self.removed && self.miss_after_remove && self.cleared
    }
}

/// Run the probe command.
pub fn run(path: &Path, namespace: &str, as_json: bool) -> Result<(), CliError> {
    let config = ConfigFile::load_or_default(path)?;
    let report = execute(config.cache, namespace)?;

    if as_json {
        let value = json!({
            "namespace": report.namespace,
            "engine": report.engine,
            "hit_after_put": report.hit_after_put,
            "removed": report.removed,
            "miss_after_remove": report.miss_after_remove,
            "cleared": report.cleared,
            "stats": serde_json::to_value(&report.stats)?,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Probe of namespace '{}' ({} engine)", report.namespace, report.engine);
        println!("  put then get:      {}", verdict(report.hit_after_put));
        println!("  remove:            {}", verdict(report.removed));
        println!("  get after remove:  {}", verdict(report.miss_after_remove));
        println!("  clear:             {}", verdict(report.cleared));
        println!();
        println!("Stats: {}", report.stats);
    }
    Ok(())
}

/// Run one probe round against a freshly started service.
pub fn execute(config: CacheConfig, namespace: &str) -> Result<ProbeReport, CliError> {
    let service = CacheService::<String>::start(config)?;
    let cache = service.named_cache(namespace)?;
    let _guard = cache.read_write_lock().write();

    cache.put(&PROBE_KEY, PROBE_VALUE.to_string())?;
    let hit_after_put = cache.get(&PROBE_KEY)?.as_deref() == Some(PROBE_VALUE);

    let removed = cache.remove(&PROBE_KEY)?.as_deref() == Some(PROBE_VALUE);
    let miss_after_remove = cache.get(&PROBE_KEY)?.is_none();

    for i in 0..CLEAR_KEYS {
        cache.put(&format!("{}:{}", namespace, i), i.to_string())?;
    }
    cache.clear()?;
    let mut cleared = true;
    for i in 0..CLEAR_KEYS {
        if cache.get(&format!("{}:{}", namespace, i))?.is_some() {
            cleared = false;
        }
    }

    let report = ProbeReport {
        namespace: cache.id().to_string(),
        engine: service.engine().name(),
        hit_after_put,
        removed,
        miss_after_remove,
        cleared,
        stats: service.stats(),
    };
    debug!(?report, "Probe finished");

    service.shutdown();

    if report.engine != "null" && !report.all_passed() {
        return Err(CliError::Probe(format!(
            "engine '{}' did not honour the cache contract: {:?}",
            report.engine, report
        )));
    }
    Ok(report)
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querycache::EngineKind;
    use tempfile::TempDir;

    #[test]
    fn test_probe_memory_engine() {
        let report = execute(CacheConfig::default(), "orders").unwrap();

        assert!(report.all_passed());
        assert_eq!(report.engine, "memory");
        assert_eq!(report.namespace, "orders");
        assert_eq!(report.stats.puts, 1 + CLEAR_KEYS as u64);
        assert_eq!(report.stats.entries, 0);
    }

    #[test]
    fn test_probe_null_engine() {
        let config = CacheConfig::default().with_engine(EngineKind::Null);
        let report = execute(config, "orders").unwrap();

        assert_eq!(report.engine, "null");
        assert!(!report.hit_after_put);
        assert!(report.miss_after_remove);
        assert!(report.cleared);
    }

    #[test]
    fn test_probe_rejects_empty_namespace() {
        let result = execute(CacheConfig::default(), "");
        assert!(matches!(result, Err(CliError::Cache(_))));
    }

    #[test]
    fn test_probe_run_with_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[cache]\nmax_entries = 16\n").unwrap();

        run(&path, "users", true).unwrap();
        run(&path, "users", false).unwrap();
    }
}
