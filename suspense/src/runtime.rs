use std::{future::Future, pin::Pin, thread};

/// A trait for spawning a future onto an asynchronous runtime.
///
/// The cache hands every factory future to its spawner, so pending
/// computations make progress even while no caller is waiting on them.
pub trait TaskSpawner: Send + Sync + 'static {
  /// Spawns a type-erased future.
  fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>);
}

#[cfg(feature = "tokio")]
pub struct TokioSpawner(tokio::runtime::Handle);

#[cfg(feature = "tokio")]
impl TokioSpawner {
  /// Creates a spawner that uses the current Tokio runtime context.
  /// Panics if called outside of a Tokio runtime; see [`TokioSpawner::try_current`].
  pub fn new() -> Self {
    Self(tokio::runtime::Handle::current())
  }

  /// Creates a spawner for the current Tokio runtime, if there is one.
  pub fn try_current() -> Option<Self> {
    tokio::runtime::Handle::try_current().ok().map(Self)
  }

  pub fn from_handle(handle: tokio::runtime::Handle) -> Self {
    Self(handle)
  }
}

#[cfg(feature = "tokio")]
impl TaskSpawner for TokioSpawner {
  fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
    self.0.spawn(future);
  }
}

/// Runs each future to completion on its own OS thread.
///
/// Needs no runtime, which makes it the fallback for hosts that only block.
/// If the OS refuses a thread the future is dropped, which abandons its entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl TaskSpawner for ThreadSpawner {
  fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
    let spawned = thread::Builder::new()
      .name(TASK_THREAD_NAME.to_string())
      .spawn(move || futures_executor::block_on(future));
    if let Err(err) = spawned {
      tracing::warn!(error = %err, "failed to spawn suspense task thread");
    }
  }
}

const TASK_THREAD_NAME: &str = "suspense-task";
