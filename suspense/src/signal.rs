use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::{self, Thread};
use std::time::{Duration, Instant};

/// Represents a party suspended on a `Signal`.
pub(crate) enum Waiter {
  Sync(Thread),
  Async(Waker),
}

impl Waiter {
  fn wake(self) {
    match self {
      Waiter::Sync(thread) => thread.unpark(),
      Waiter::Async(waker) => waker.wake(),
    }
  }
}

/// The mutex-protected core of a `Signal`.
pub(crate) struct Inner {
  pub(crate) settled: bool,
  pub(crate) waiters: VecDeque<Waiter>,
}

impl Inner {
  /// Queues the current thread for unparking, once per thread.
  fn register_current_thread(&mut self) {
    let current = thread::current();
    let queued = self
      .waiters
      .iter()
      .any(|w| matches!(w, Waiter::Sync(thread) if thread.id() == current.id()));
    if !queued {
      self.waiters.push_back(Waiter::Sync(current));
    }
  }
}

/// Settlement flag of one cache entry's pending operation.
/// It can be waited on by sync threads and async tasks simultaneously.
pub(crate) struct Signal {
  pub(crate) inner: Mutex<Inner>,
}

impl Signal {
  /// Creates a new, unsettled `Signal`.
  pub(crate) fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        settled: false,
        waiters: VecDeque::new(),
      }),
    }
  }

  /// Marks the signal settled and wakes every waiter. Idempotent.
  pub(crate) fn settle(&self) {
    let mut inner = self.inner.lock();
    if inner.settled {
      return;
    }
    inner.settled = true;
    for waiter in inner.waiters.drain(..) {
      waiter.wake();
    }
  }

  pub(crate) fn is_settled(&self) -> bool {
    self.inner.lock().settled
  }
}

/// A handle to an entry whose operation has not settled yet.
///
/// This is what a unit of work receives instead of a value. The host waits
/// on it, either by `.await`ing it or by calling [`Suspension::wait`], and
/// then re-invokes the unit of work from the start. The handle carries no
/// value: the re-invoked work reads the outcome from the cache.
///
/// Dropping a `Suspension` does not cancel the underlying operation.
#[derive(Clone)]
#[must_use = "a suspension should be waited on before re-entering the work"]
pub struct Suspension {
  signal: Arc<Signal>,
}

impl Suspension {
  pub(crate) fn new(signal: Arc<Signal>) -> Self {
    Self { signal }
  }

  /// Returns `true` once the operation has completed, failed or been abandoned.
  pub fn is_settled(&self) -> bool {
    self.signal.is_settled()
  }

  /// Blocks the current thread until the operation settles.
  pub fn wait(&self) {
    loop {
      {
        let mut inner = self.signal.inner.lock();
        if inner.settled {
          return;
        }
        inner.register_current_thread();
      }
      // Spurious wakeups are handled by re-checking under the lock.
      thread::park();
    }
  }

  /// Blocks for at most `timeout`. Returns `true` if the operation settled.
  pub fn wait_timeout(&self, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
      {
        let mut inner = self.signal.inner.lock();
        if inner.settled {
          return true;
        }
        inner.register_current_thread();
      }
      let now = Instant::now();
      if now >= deadline {
        return self.is_settled();
      }
      thread::park_timeout(deadline - now);
    }
  }

  /// Whether two handles refer to the same entry.
  pub fn same_entry(&self, other: &Suspension) -> bool {
    Arc::ptr_eq(&self.signal, &other.signal)
  }
}

impl std::fmt::Debug for Suspension {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Suspension")
      .field("settled", &self.is_settled())
      .finish()
  }
}

impl Future for Suspension {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut inner = self.signal.inner.lock();
    if inner.settled {
      return Poll::Ready(());
    }
    if !inner.waiters.iter().any(|w| matches!(w, Waiter::Async(waker) if waker.will_wake(cx.waker()))) {
      inner.waiters.push_back(Waiter::Async(cx.waker().clone()));
    }
    Poll::Pending
  }
}
