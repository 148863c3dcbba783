//! The re-entrant host loop.
//!
//! A unit of work is a closure that reads memoized values through
//! [`Resolution::read`](crate::Resolution::read) and returns
//! `Result<T, Interrupt<E>>`. The host calls it, waits whenever it reports a
//! suspension, and calls it again from the start. The work must therefore be
//! safe to repeat: everything it did before suspending is done again on the
//! next entry.

use crate::resolution::Interrupt;

use std::sync::Arc;

use tracing::trace;

/// Drives `work` to completion on an async runtime.
///
/// Returns the work's output, or the first stored failure it ran into.
pub async fn run<T, E, F>(mut work: F) -> Result<T, Arc<E>>
where
  F: FnMut() -> Result<T, Interrupt<E>>,
{
  let mut reentries: u64 = 0;
  loop {
    match work() {
      Ok(output) => return Ok(output),
      Err(Interrupt::Failed(error)) => return Err(error),
      Err(Interrupt::Suspended(suspension)) => {
        suspension.await;
        reentries += 1;
        trace!(reentries, "re-entering suspended work");
      }
    }
  }
}

/// Drives `work` to completion, parking the current thread while suspended.
pub fn run_blocking<T, E, F>(mut work: F) -> Result<T, Arc<E>>
where
  F: FnMut() -> Result<T, Interrupt<E>>,
{
  let mut reentries: u64 = 0;
  loop {
    match work() {
      Ok(output) => return Ok(output),
      Err(Interrupt::Failed(error)) => return Err(error),
      Err(Interrupt::Suspended(suspension)) => {
        suspension.wait();
        reentries += 1;
        trace!(reentries, "re-entering suspended work");
      }
    }
  }
}
