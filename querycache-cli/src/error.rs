//! CLI error type.

use querycache::{CacheError, ConfigError};
use thiserror::Error;

/// Errors surfaced to the user by the `querycache` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded, validated, or written.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cache engine rejected an operation.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// A probe round produced an unexpected result.
    #[error("Probe failed: {0}")]
    Probe(String),

    /// Output could not be rendered.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_from_cache_error() {
        let err: CliError = CacheError::Unavailable("engine shut down".to_string()).into();
        assert!(matches!(err, CliError::Cache(_)));
        assert!(err.to_string().contains("engine shut down"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let err: CliError = ConfigError::NoHomeDir.into();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
