use crate::deps::Deps;
use crate::signal::{Signal, Suspension};

use std::sync::Arc;

use once_cell::sync::OnceCell;

/// How an entry's operation ended.
pub(crate) enum Outcome<V, E> {
  Value(Arc<V>),
  Failure(Arc<E>),
  /// The operation was dropped before producing a result, e.g. the factory
  /// panicked or its task was torn down with the runtime.
  Abandoned,
}

/// One in-flight or completed computation.
pub(crate) struct CacheEntry<V, E> {
  /// Identity of the computation. Never changes after creation.
  pub(crate) deps: Deps,
  signal: Arc<Signal>,
  /// Written at most once; the enum keeps value and failure exclusive.
  outcome: OnceCell<Outcome<V, E>>,
}

impl<V, E> CacheEntry<V, E> {
  pub(crate) fn new(deps: Deps) -> Self {
    Self {
      deps,
      signal: Arc::new(Signal::new()),
      outcome: OnceCell::new(),
    }
  }

  /// Returns the outcome once the operation has settled.
  #[inline]
  pub(crate) fn outcome(&self) -> Option<&Outcome<V, E>> {
    self.outcome.get()
  }

  pub(crate) fn suspension(&self) -> Suspension {
    Suspension::new(self.signal.clone())
  }

  /// Stores the operation's result and wakes all suspended callers.
  /// Returns `false` if the entry had already settled.
  pub(crate) fn complete(&self, result: Result<V, E>) -> bool {
    let outcome = match result {
      Ok(value) => Outcome::Value(Arc::new(value)),
      Err(error) => Outcome::Failure(Arc::new(error)),
    };
    self.settle(outcome)
  }

  pub(crate) fn abandon(&self) -> bool {
    self.settle(Outcome::Abandoned)
  }

  fn settle(&self, outcome: Outcome<V, E>) -> bool {
    let stored = self.outcome.set(outcome).is_ok();
    if stored {
      self.signal.settle();
    }
    stored
  }
}

/// Abandons its entry on drop unless the operation completed first.
///
/// Held across the factory call and the spawned operation so a panic or a
/// dropped task still settles the entry and releases everyone waiting on it.
pub(crate) struct CompletionGuard<V, E> {
  entry: Arc<CacheEntry<V, E>>,
  on_abandon: Option<Box<dyn FnOnce(&Deps) + Send>>,
}

impl<V, E> CompletionGuard<V, E> {
  pub(crate) fn new(entry: Arc<CacheEntry<V, E>>, on_abandon: Box<dyn FnOnce(&Deps) + Send>) -> Self {
    Self {
      entry,
      on_abandon: Some(on_abandon),
    }
  }

  pub(crate) fn entry(&self) -> &Arc<CacheEntry<V, E>> {
    &self.entry
  }
}

impl<V, E> Drop for CompletionGuard<V, E> {
  fn drop(&mut self) {
    if self.entry.abandon() {
      if let Some(on_abandon) = self.on_abandon.take() {
        on_abandon(&self.entry.deps);
      }
    }
  }
}
