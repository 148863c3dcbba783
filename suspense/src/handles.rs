use crate::builder::SuspenseCacheBuilder;
use crate::deps::Deps;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::resolution::Resolution;
use crate::shared::CacheShared;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A memoizing cache of asynchronous computations, keyed by dependency list.
///
/// Each distinct dependency list starts at most one computation for the
/// lifetime of the cache. Callers get a [`Resolution`]: the value, the stored
/// failure, or a [`Suspension`](crate::Suspension) to wait on before
/// re-entering. Entries are never evicted; dropping the last handle discards
/// them all.
///
/// Cloning is cheap and every clone shares the same entries.
pub struct SuspenseCache<V, E> {
  pub(crate) shared: Arc<CacheShared<V, E>>,
}

impl<V, E> Clone for SuspenseCache<V, E> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<V, E> fmt::Debug for SuspenseCache<V, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SuspenseCache")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<V, E> SuspenseCache<V, E>
where
  V: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  pub fn builder() -> SuspenseCacheBuilder<V, E> {
    SuspenseCacheBuilder::new()
  }

  /// Resolves the computation identified by `deps`.
  ///
  /// If an entry with matching dependencies exists it is reused and
  /// `factory` is not called. Otherwise a new entry is recorded, `factory` is
  /// called exactly once on this thread, and the future it returns is handed
  /// to the cache's spawner. Its result is stored in the entry and every
  /// caller suspended on it is woken.
  ///
  /// # Panics
  ///
  /// Panics if the matching entry was abandoned, i.e. its factory or future
  /// panicked or its task was dropped before completing. A panic in
  /// `factory` itself propagates to the caller.
  pub fn resolve<F, Fut>(&self, factory: F, deps: impl Into<Deps>) -> Resolution<V, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
  {
    let (entry, created) = self.shared.find_or_insert(deps.into());
    if !created {
      return self.shared.read_entry(&entry, true);
    }

    Metrics::incr(&self.shared.metrics.misses);
    self.shared.spawn_factory(entry.clone(), factory);
    // A spawner may run the future inline, so the entry can already be settled.
    self.shared.read_entry(&entry, false)
  }

  /// Like [`resolve`](Self::resolve), for a blocking factory.
  ///
  /// On a miss, `factory` runs on a dedicated thread, so the caller is never
  /// blocked by it and always receives `Pending` for a fresh entry.
  pub fn resolve_blocking<F>(&self, factory: F, deps: impl Into<Deps>) -> Resolution<V, E>
  where
    F: FnOnce() -> Result<V, E> + Send + 'static,
  {
    let (entry, created) = self.shared.find_or_insert(deps.into());
    if !created {
      return self.shared.read_entry(&entry, true);
    }

    Metrics::incr(&self.shared.metrics.misses);
    self.shared.spawn_blocking_factory(entry.clone(), factory);
    self.shared.read_entry(&entry, false)
  }

  /// Looks up `deps` without creating an entry or touching the metrics.
  ///
  /// # Panics
  ///
  /// Panics if the matching entry was abandoned.
  pub fn peek(&self, deps: impl Into<Deps>) -> Option<Resolution<V, E>> {
    let deps = deps.into();
    self
      .shared
      .find(&deps)
      .map(|entry| self.shared.read_entry(&entry, false))
  }

  /// The number of entries, pending or settled.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn name(&self) -> &str {
    &self.shared.name
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot(self.shared.len())
  }
}
