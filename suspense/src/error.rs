use thiserror::Error;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// No `TaskSpawner` was configured and no Tokio runtime was found to
  /// drive factory futures.
  #[error("no task spawner configured and no tokio runtime is available")]
  SpawnerRequired,
  /// A cache name was configured but is blank.
  #[error("cache name cannot be empty")]
  EmptyName,
}

/// Errors raised while reading a `SuspenseConfig` document.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse YAML configuration: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("failed to parse JSON configuration: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid configuration value for '{field}': {message}")]
  InvalidValue { field: &'static str, message: String },
}

/// A specialized `Result` type for configuration loading.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
