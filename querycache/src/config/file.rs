//! INI configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::{CacheConfig, ConfigError, EngineKind};

/// Section holding the cache settings.
const CACHE_SECTION: &str = "cache";

const KEY_ENGINE: &str = "engine";
const KEY_MAX_ENTRIES: &str = "max_entries";
const KEY_TIME_TO_LIVE: &str = "time_to_live_secs";
const KEY_REFRESH_PERIOD: &str = "refresh_period_secs";

/// Contents of a querycache configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Settings of the `[cache]` section.
    pub cache: CacheConfig,
}

impl ConfigFile {
    /// Default location: `~/.querycache/config.ini`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".querycache").join("config.ini"))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid INI, or holds a value
    /// that does not parse.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(err) => ConfigError::Parse {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        })?;

        debug!(path = %path.display(), "Loaded cache configuration");
        Self::from_ini(&ini)
    }

    /// Load a configuration file, falling back to defaults if it is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from INI text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Write the configuration, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        self.to_ini().write_to_file(path).map_err(io_err)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut cache = CacheConfig::default();

        if let Some(section) = ini.section(Some(CACHE_SECTION)) {
            if let Some(value) = section.get(KEY_ENGINE) {
                cache.engine = value.parse::<EngineKind>()?;
            }
            if let Some(value) = section.get(KEY_MAX_ENTRIES) {
                cache.max_entries = parse_u64(KEY_MAX_ENTRIES, value)?;
            }
            if let Some(value) = section.get(KEY_TIME_TO_LIVE) {
                cache.time_to_live = parse_secs(KEY_TIME_TO_LIVE, value)?;
            }
            if let Some(value) = section.get(KEY_REFRESH_PERIOD) {
                cache.refresh_period = parse_secs(KEY_REFRESH_PERIOD, value)?;
            }
        }

        cache.validate()?;
        Ok(Self { cache })
    }

    fn to_ini(&self) -> Ini {
        let secs = |d: Option<Duration>| d.map(whole_secs).unwrap_or(0).to_string();

        let mut ini = Ini::new();
        ini.with_section(Some(CACHE_SECTION))
            .set(KEY_ENGINE, self.cache.engine.as_str())
            .set(KEY_MAX_ENTRIES, self.cache.max_entries.to_string())
            .set(KEY_TIME_TO_LIVE, secs(self.cache.time_to_live))
            .set(KEY_REFRESH_PERIOD, secs(self.cache.refresh_period));
        ini
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a whole number".to_string(),
        })
}

/// Whole seconds, rounded up so a sub-second setting does not save as `0`.
fn whole_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Seconds to a duration, `0` meaning disabled.
fn parse_secs(key: &str, value: &str) -> Result<Option<Duration>, ConfigError> {
    let secs = parse_u64(key, value)?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_section() {
        let config = ConfigFile::parse(
            "[cache]\n\
             engine = null\n\
             max_entries = 250\n\
             time_to_live_secs = 600\n\
             refresh_period_secs = 60\n",
        )
        .unwrap();

        assert_eq!(config.cache.engine, EngineKind::Null);
        assert_eq!(config.cache.max_entries, 250);
        assert_eq!(config.cache.time_to_live, Some(Duration::from_secs(600)));
        assert_eq!(config.cache.refresh_period, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_missing_section_uses_defaults() {
        let config = ConfigFile::parse("[other]\nkey = value\n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_parse_zero_disables_durations() {
        let config =
            ConfigFile::parse("[cache]\ntime_to_live_secs = 0\nrefresh_period_secs = 0\n").unwrap();
        assert!(config.cache.time_to_live.is_none());
        assert!(config.cache.refresh_period.is_none());
    }

    #[test]
    fn test_parse_invalid_number() {
        let result = ConfigFile::parse("[cache]\nmax_entries = lots\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "max_entries"
        ));
    }

    #[test]
    fn test_parse_invalid_engine() {
        let result = ConfigFile::parse("[cache]\nengine = redis\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "engine"
        ));
    }

    #[test]
    fn test_parse_rejects_zero_capacity() {
        let result = ConfigFile::parse("[cache]\nmax_entries = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let config = ConfigFile {
            cache: CacheConfig::default()
                .with_max_entries(42)
                .with_refresh_period(Duration::from_secs(90)),
        };
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_rounds_sub_second_durations_up() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");

        let config = ConfigFile {
            cache: CacheConfig::default()
                .with_time_to_live(Duration::from_millis(1_500))
                .with_refresh_period(Duration::from_millis(250)),
        };
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.cache.time_to_live, Some(Duration::from_secs(2)));
        assert_eq!(loaded.cache.refresh_period, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.ini");

        let config = ConfigFile::load_or_default(&path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.ini");

        assert!(matches!(
            ConfigFile::load_from(&path),
            Err(ConfigError::Io { .. })
        ));
    }
}
