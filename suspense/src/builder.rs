use crate::config::{RuntimeKind, SuspenseConfig};
use crate::error::BuildError;
use crate::handles::SuspenseCache;
use crate::metrics::Metrics;
use crate::runtime::ThreadSpawner;
use crate::shared::CacheShared;
use crate::TaskSpawner;

use core::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

const DEFAULT_NAME: &str = "suspense";

/// A builder for creating `SuspenseCache` instances.
pub struct SuspenseCacheBuilder<V, E> {
  name: Option<String>,
  spawner: Option<Arc<dyn TaskSpawner>>,
  _marker: PhantomData<fn() -> (V, E)>,
}

impl<V, E> fmt::Debug for SuspenseCacheBuilder<V, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SuspenseCacheBuilder")
      .field("name", &self.name)
      .field("has_spawner", &self.spawner.is_some())
      .finish()
  }
}

impl<V, E> Default for SuspenseCacheBuilder<V, E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V, E> SuspenseCacheBuilder<V, E> {
  /// Creates a new `SuspenseCacheBuilder` with default settings.
  pub fn new() -> Self {
    Self {
      name: None,
      spawner: None,
      _marker: PhantomData,
    }
  }

  /// Starts from an external configuration.
  pub fn from_config(config: &SuspenseConfig) -> Self {
    let mut builder = Self::new();
    builder.name = config.name.clone();
    if config.runtime == RuntimeKind::Thread {
      builder.spawner = Some(Arc::new(ThreadSpawner));
    }
    builder
  }

  /// Sets the name used in log events. Defaults to `"suspense"`.
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Sets the spawner that drives factory futures.
  ///
  /// Without one, `build` uses the current Tokio runtime when the `tokio`
  /// feature is enabled.
  pub fn spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
    self.spawner = Some(spawner);
    self
  }
}

impl<V, E> SuspenseCacheBuilder<V, E>
where
  V: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  pub fn build(mut self) -> Result<SuspenseCache<V, E>, BuildError> {
    self.validate()?;

    let spawner = match self.spawner.take() {
      Some(spawner) => spawner,
      None => default_spawner()?,
    };
    let name: Arc<str> = self.name.take().unwrap_or_else(|| DEFAULT_NAME.to_string()).into();

    Ok(SuspenseCache {
      shared: Arc::new(CacheShared {
        name,
        entries: Mutex::new(Vec::new()),
        metrics: Arc::new(Metrics::new()),
        spawner,
      }),
    })
  }

  pub(crate) fn validate(&self) -> Result<(), BuildError> {
    if let Some(name) = &self.name {
      if name.trim().is_empty() {
        return Err(BuildError::EmptyName);
      }
    }
    Ok(())
  }
}

#[cfg(feature = "tokio")]
fn default_spawner() -> Result<Arc<dyn TaskSpawner>, BuildError> {
  crate::runtime::TokioSpawner::try_current()
    .map(|spawner| Arc::new(spawner) as Arc<dyn TaskSpawner>)
    .ok_or(BuildError::SpawnerRequired)
}

#[cfg(not(feature = "tokio"))]
fn default_spawner() -> Result<Arc<dyn TaskSpawner>, BuildError> {
  Err(BuildError::SpawnerRequired)
}
