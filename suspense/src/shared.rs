use crate::deps::Deps;
use crate::entry::{CacheEntry, CompletionGuard, Outcome};
use crate::metrics::Metrics;
use crate::resolution::Resolution;
use crate::TaskSpawner;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

/// The internal, thread-safe core of the cache.
pub(crate) struct CacheShared<V, E> {
  pub(crate) name: Arc<str>,
  /// Insertion-ordered. Entries are only ever appended.
  pub(crate) entries: Mutex<Vec<Arc<CacheEntry<V, E>>>>,
  pub(crate) metrics: Arc<Metrics>,
  pub(crate) spawner: Arc<dyn TaskSpawner>,
}

impl<V, E> fmt::Debug for CacheShared<V, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("name", &self.name)
      .field("metrics", &self.metrics.snapshot(self.len()))
      .finish_non_exhaustive()
  }
}

impl<V, E> CacheShared<V, E> {
  pub(crate) fn len(&self) -> usize {
    self.entries.lock().len()
  }

  /// Linear scan; the first entry whose dependencies match wins.
  pub(crate) fn find(&self, deps: &Deps) -> Option<Arc<CacheEntry<V, E>>> {
    self
      .entries
      .lock()
      .iter()
      .find(|entry| entry.deps.matches(deps))
      .cloned()
  }

  /// Looks up `deps` and appends a fresh entry if none matches, in one
  /// critical section. The flag is `true` when the entry was created.
  pub(crate) fn find_or_insert(&self, deps: Deps) -> (Arc<CacheEntry<V, E>>, bool) {
    let mut entries = self.entries.lock();
    if let Some(entry) = entries.iter().find(|entry| entry.deps.matches(&deps)) {
      return (entry.clone(), false);
    }
    let entry = Arc::new(CacheEntry::new(deps));
    entries.push(entry.clone());
    (entry, true)
  }

  /// Maps an entry's current state to a `Resolution`, recording the lookup
  /// in the metrics when `record` is set.
  ///
  /// # Panics
  ///
  /// Panics if the entry was abandoned.
  pub(crate) fn read_entry(&self, entry: &CacheEntry<V, E>, record: bool) -> Resolution<V, E> {
    match entry.outcome() {
      Some(Outcome::Value(value)) => {
        if record {
          Metrics::incr(&self.metrics.hits);
          trace!(cache = %self.name, deps = ?entry.deps, "hit");
        }
        Resolution::Ready(value.clone())
      }
      Some(Outcome::Failure(error)) => {
        if record {
          Metrics::incr(&self.metrics.failures_served);
          trace!(cache = %self.name, deps = ?entry.deps, "serving stored failure");
        }
        Resolution::Failed(error.clone())
      }
      Some(Outcome::Abandoned) => panic!(
        "memoized computation for {:?} in cache '{}' was abandoned before completing",
        entry.deps, self.name
      ),
      None => {
        if record {
          Metrics::incr(&self.metrics.suspensions);
          trace!(cache = %self.name, deps = ?entry.deps, "suspending on pending computation");
        }
        Resolution::Pending(entry.suspension())
      }
    }
  }

  fn completion_guard(&self, entry: Arc<CacheEntry<V, E>>) -> CompletionGuard<V, E> {
    let metrics = self.metrics.clone();
    let name = self.name.clone();
    CompletionGuard::new(
      entry,
      Box::new(move |deps: &Deps| {
        Metrics::incr(&metrics.abandoned);
        warn!(cache = %name, deps = ?deps, "memoized computation abandoned before completing");
      }),
    )
  }
}

impl<V, E> CacheShared<V, E>
where
  V: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Invokes `factory` and hands its future to the spawner.
  ///
  /// The factory runs on the calling thread. If it panics, the entry is
  /// abandoned before the panic continues to unwind.
  pub(crate) fn spawn_factory<F, Fut>(&self, entry: Arc<CacheEntry<V, E>>, factory: F)
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
  {
    let guard = self.completion_guard(entry);
    debug!(cache = %self.name, deps = ?guard.entry().deps, "invoking factory");
    let future = factory();

    let metrics = self.metrics.clone();
    let name = self.name.clone();
    let task = async move {
      let result = future.await;
      record_settlement(&metrics, &name, guard.entry(), result);
    };
    self.spawner.spawn(Box::pin(task));
  }

  /// Runs a blocking `factory` on a dedicated thread.
  pub(crate) fn spawn_blocking_factory<F>(&self, entry: Arc<CacheEntry<V, E>>, factory: F)
  where
    F: FnOnce() -> Result<V, E> + Send + 'static,
  {
    let guard = self.completion_guard(entry);
    debug!(cache = %self.name, deps = ?guard.entry().deps, "invoking blocking factory");

    let metrics = self.metrics.clone();
    let name = self.name.clone();
    let spawned = thread::Builder::new()
      .name(format!("{}-factory", self.name))
      .spawn(move || {
        let result = factory();
        record_settlement(&metrics, &name, guard.entry(), result);
      });

    // On failure the closure, and with it the guard, has been dropped, so
    // the entry is already abandoned.
    if let Err(err) = spawned {
      warn!(cache = %self.name, error = %err, "failed to spawn factory thread");
    }
  }
}

fn record_settlement<V, E>(metrics: &Metrics, name: &str, entry: &CacheEntry<V, E>, result: Result<V, E>) {
  let ok = result.is_ok();
  if !entry.complete(result) {
    return;
  }
  if ok {
    Metrics::incr(&metrics.settled_ok);
    debug!(cache = %name, deps = ?entry.deps, "memoized computation completed");
  } else {
    Metrics::incr(&metrics.settled_err);
    debug!(cache = %name, deps = ?entry.deps, "memoized computation failed");
  }
}
