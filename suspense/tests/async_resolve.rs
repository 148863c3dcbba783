#![cfg(feature = "tokio")]

mod common;

use common::{Calls, LoadError};
use paper_suspense::{deps, host, Interrupt, Resolution, SuspenseCache};
use std::sync::Arc;
use tokio::sync::{oneshot, Barrier};
use tokio::time::{sleep, Duration};

fn build_tokio_cache() -> SuspenseCache<String, LoadError> {
  SuspenseCache::builder().name("docs").build().unwrap()
}

#[tokio::test]
async fn test_pending_then_ready_after_resume() {
  let cache = build_tokio_cache();
  let calls = Calls::default();
  let (tx, rx) = oneshot::channel::<String>();

  let first = cache.resolve(
    {
      let calls = calls.clone();
      move || {
        calls.hit();
        async move { rx.await.map_err(|_| LoadError("sender dropped".into())) }
      }
    },
    ["doc-1"],
  );
  let suspension = match first {
    Resolution::Pending(suspension) => suspension,
    other => panic!("expected a pending entry, got {:?}", other),
  };
  assert!(!suspension.is_settled());

  tx.send("hello".to_string()).unwrap();
  suspension.await;

  // Re-entering finds the settled entry without calling the factory again.
  let value = cache
    .resolve(
      || async { Err(LoadError("must not run".into())) },
      ["doc-1"],
    )
    .ready()
    .expect("entry should be ready");
  assert_eq!(*value, "hello");
  assert_eq!(calls.count(), 1);

  let metrics = cache.metrics();
  assert_eq!(metrics.misses, 1);
  assert_eq!(metrics.hits, 1);
  assert_eq!(metrics.settled_ok, 1);
  assert_eq!(metrics.entries, 1);
}

#[tokio::test]
async fn test_hit_returns_same_arc() {
  let cache = build_tokio_cache();
  let load = || async { Ok::<_, LoadError>("page".to_string()) };

  let first = host::run(|| cache.resolve(load, deps![1, 2]).read()).await.unwrap();
  let second = host::run(|| cache.resolve(load, deps![1, 2]).read()).await.unwrap();
  assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_failure_is_sticky_and_verbatim() {
  let cache = build_tokio_cache();
  let calls = Calls::default();
  let factory = {
    let calls = calls.clone();
    move || {
      calls.hit();
      async { Err(LoadError("ipfs unreachable".into())) }
    }
  };

  let first = host::run(|| cache.resolve(factory.clone(), ["cid"]).read())
    .await
    .unwrap_err();
  assert_eq!(*first, LoadError("ipfs unreachable".into()));

  for _ in 0..3 {
    let again = cache
      .resolve(factory.clone(), ["cid"])
      .failed()
      .expect("failure should be stored");
    assert!(Arc::ptr_eq(&first, &again));
  }
  assert_eq!(calls.count(), 1, "failed entries must not be retried");
  assert_eq!(cache.metrics().settled_err, 1);
  // The host loop's re-entry read the failure once before the loop above.
  assert_eq!(cache.metrics().failures_served, 4);
}

#[tokio::test]
async fn test_distinct_dependencies_are_independent() {
  let cache = build_tokio_cache();
  let (tx_a, rx_a) = oneshot::channel::<String>();
  let (_tx_b, rx_b) = oneshot::channel::<String>();

  let a = cache.resolve(
    move || async move { rx_a.await.map_err(|_| LoadError("a".into())) },
    [1, 2],
  );
  let b = cache.resolve(
    move || async move { rx_b.await.map_err(|_| LoadError("b".into())) },
    [1, 3],
  );
  assert!(a.is_pending());
  assert!(b.is_pending());
  assert_eq!(cache.len(), 2);

  tx_a.send("a".to_string()).unwrap();
  match a {
    Resolution::Pending(suspension) => suspension.await,
    other => panic!("unexpected {:?}", other),
  }

  assert!(cache.peek([1, 2]).unwrap().is_ready());
  assert!(cache.peek([1, 3]).unwrap().is_pending());
}

#[tokio::test]
async fn test_length_sensitive_lookup() {
  let cache = build_tokio_cache();
  let calls = Calls::default();
  let factory = |tag: &'static str| {
    let calls = calls.clone();
    move || {
      calls.hit();
      async move { Ok(tag.to_string()) }
    }
  };

  let short = host::run(|| cache.resolve(factory("short"), [1, 2]).read()).await.unwrap();
  let long = host::run(|| cache.resolve(factory("long"), [1, 2, 3]).read()).await.unwrap();
  let short_again = host::run(|| cache.resolve(factory("other"), vec![1, 2]).read())
    .await
    .unwrap();

  assert_eq!(*short, "short");
  assert_eq!(*long, "long");
  assert_eq!(*short_again, "short");
  assert_eq!(calls.count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_factory_run() {
  let calls = Calls::default();
  let num_tasks = 20;
  let cache = Arc::new(build_tokio_cache());
  let barrier = Arc::new(Barrier::new(num_tasks));

  let mut tasks = vec![];
  for _ in 0..num_tasks {
    let cache = cache.clone();
    let barrier = barrier.clone();
    let calls = calls.clone();
    tasks.push(tokio::spawn(async move {
      barrier.wait().await;
      host::run(|| {
        let calls = calls.clone();
        cache
          .resolve(
            move || {
              calls.hit();
              async {
                // Simulate a slow fetch so every task finds the entry pending.
                sleep(Duration::from_millis(100)).await;
                Ok("shared".to_string())
              }
            },
            ["same"],
          )
          .read()
      })
      .await
      .unwrap()
    }));
  }

  let mut values = vec![];
  for task in tasks {
    values.push(task.await.unwrap());
  }

  assert_eq!(calls.count(), 1, "factory ran more than once");
  assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
  assert_eq!(cache.metrics().misses, 1);
}

#[tokio::test]
async fn test_work_reading_two_entries_reenters_until_both_ready() {
  let cache = build_tokio_cache();
  let mut entries = 0;

  let joined = host::run(|| -> Result<String, Interrupt<LoadError>> {
    entries += 1;
    let title = cache
      .resolve(|| async { Ok("Title".to_string()) }, deps!["title", 7])
      .read()?;
    let body = cache
      .resolve(
        || async {
          sleep(Duration::from_millis(10)).await;
          Ok("Body".to_string())
        },
        deps!["body", 7],
      )
      .read()?;
    Ok(format!("{title}: {body}"))
  })
  .await
  .unwrap();

  assert_eq!(joined, "Title: Body");
  assert!(entries >= 2, "work should have been re-entered at least once");
  assert_eq!(cache.len(), 2);
}
