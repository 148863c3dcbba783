//! External configuration for a cache.
//!
//! A `SuspenseConfig` can be read from YAML or JSON
//! and handed to [`SuspenseCacheBuilder::from_config`](crate::SuspenseCacheBuilder::from_config).
//!
//! ```yaml
//! name: documents
//! runtime: thread
//! ```

use crate::error::{ConfigError, Result};

use serde::Deserialize;

/// Which runtime drives factory futures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeKind {
  /// The Tokio runtime current at build time.
  #[default]
  Tokio,
  /// One OS thread per factory future. Needs no runtime.
  Thread,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuspenseConfig {
  /// Name reported in log events.
  pub name: Option<String>,
  pub runtime: RuntimeKind,
}

impl SuspenseConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self> {
    let config: Self = serde_yaml::from_str(source)?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_json_str(source: &str) -> Result<Self> {
    let config: Self = serde_json::from_str(source)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name {
      if name.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
          field: "name",
          message: "must not be blank".to_string(),
        });
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn parses_yaml() {
    let config = SuspenseConfig::from_yaml_str("name: documents\nruntime: thread\n").unwrap();
    assert_eq!(
      config,
      SuspenseConfig {
        name: Some("documents".to_string()),
        runtime: RuntimeKind::Thread,
      }
    );
  }

  #[test]
  fn parses_json_with_defaults() {
    let config = SuspenseConfig::from_json_str("{}").unwrap();
    assert_eq!(config, SuspenseConfig::default());
    assert_eq!(config.runtime, RuntimeKind::Tokio);
  }

  #[test]
  fn rejects_blank_name() {
    let err = SuspenseConfig::from_yaml_str("name: '  '").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "name", .. }));
  }

  #[test]
  fn rejects_unknown_fields() {
    let err = SuspenseConfig::from_json_str(r#"{"capacity": 10}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
  }
}
