use crate::signal::Suspension;

use std::fmt;
use std::sync::Arc;

/// The result of resolving a memoized computation.
#[derive(Debug)]
pub enum Resolution<V, E> {
  /// The computation completed; the same `Arc` is handed to every caller.
  Ready(Arc<V>),
  /// The computation failed; the stored error is handed out unchanged, forever.
  Failed(Arc<E>),
  /// The computation is still running. Wait on the handle, then re-enter.
  Pending(Suspension),
}

impl<V, E> Resolution<V, E> {
  pub fn is_ready(&self) -> bool {
    matches!(self, Resolution::Ready(_))
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, Resolution::Failed(_))
  }

  pub fn is_pending(&self) -> bool {
    matches!(self, Resolution::Pending(_))
  }

  /// Returns the value if ready.
  pub fn ready(self) -> Option<Arc<V>> {
    match self {
      Resolution::Ready(value) => Some(value),
      _ => None,
    }
  }

  /// Returns the stored failure if failed.
  pub fn failed(self) -> Option<Arc<E>> {
    match self {
      Resolution::Failed(error) => Some(error),
      _ => None,
    }
  }

  /// Converts into a `Result` so a unit of work can propagate suspension and
  /// failure with `?` and let the host loop deal with both.
  pub fn read(self) -> Result<Arc<V>, Interrupt<E>> {
    match self {
      Resolution::Ready(value) => Ok(value),
      Resolution::Failed(error) => Err(Interrupt::Failed(error)),
      Resolution::Pending(suspension) => Err(Interrupt::Suspended(suspension)),
    }
  }
}

impl<V, E> Clone for Resolution<V, E> {
  fn clone(&self) -> Self {
    match self {
      Resolution::Ready(value) => Resolution::Ready(value.clone()),
      Resolution::Failed(error) => Resolution::Failed(error.clone()),
      Resolution::Pending(suspension) => Resolution::Pending(suspension.clone()),
    }
  }
}

/// Why a unit of work stopped before producing its result.
#[derive(Debug)]
pub enum Interrupt<E> {
  /// A value it needs is still being computed.
  Suspended(Suspension),
  /// A computation it depends on failed.
  Failed(Arc<E>),
}

impl<E> Interrupt<E> {
  /// Converts the failure type, keeping suspensions as they are.
  ///
  /// Useful when one unit of work reads from caches with different error
  /// types.
  pub fn map_failure<F>(self, f: impl FnOnce(Arc<E>) -> Arc<F>) -> Interrupt<F> {
    match self {
      Interrupt::Suspended(suspension) => Interrupt::Suspended(suspension),
      Interrupt::Failed(error) => Interrupt::Failed(f(error)),
    }
  }
}

impl<E: fmt::Display> fmt::Display for Interrupt<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Interrupt::Suspended(_) => write!(f, "suspended on a pending computation"),
      Interrupt::Failed(error) => write!(f, "memoized computation failed: {}", error),
    }
  }
}
