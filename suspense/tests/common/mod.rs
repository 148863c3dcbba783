#![allow(dead_code)]

use paper_suspense::{SuspenseCache, TaskSpawner, ThreadSpawner};
use std::future::Future;
use std::pin::Pin;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A spawner that polls the future to completion before returning, so a
// factory settles inside the `resolve` call that started it.
pub struct InlineSpawner;
impl TaskSpawner for InlineSpawner {
  fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
    futures_executor::block_on(future);
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError(pub String);

impl std::fmt::Display for LoadError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "load error: {}", self.0)
  }
}

pub fn build_thread_cache() -> SuspenseCache<String, LoadError> {
  SuspenseCache::builder()
    .name("test")
    .spawner(Arc::new(ThreadSpawner))
    .build()
    .unwrap()
}

pub fn build_inline_cache() -> SuspenseCache<String, LoadError> {
  SuspenseCache::builder()
    .name("inline")
    .spawner(Arc::new(InlineSpawner))
    .build()
    .unwrap()
}

// Wraps a counter so tests can assert how many times a factory ran.
#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
  pub fn hit(&self) {
    self.0.fetch_add(1, Ordering::SeqCst);
  }

  pub fn count(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}
