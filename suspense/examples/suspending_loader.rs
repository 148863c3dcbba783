use paper_suspense::{deps, host, Interrupt, SuspenseCache};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tokio::time::{sleep, Duration};

// A simulated document store with a slow fetch.
async fn fetch_document(id: u32, fetches: Arc<AtomicUsize>) -> Result<String, String> {
  println!("--- Store: fetching document {}...", id);
  fetches.fetch_add(1, Ordering::SeqCst);
  sleep(Duration::from_millis(300)).await;
  if id == 0 {
    return Err("document 0 does not exist".to_string());
  }
  Ok(format!("contents of document {}", id))
}

// A unit of work that can be re-entered from the top any number of times.
fn render(
  cache: &SuspenseCache<String, String>,
  id: u32,
  fetches: &Arc<AtomicUsize>,
) -> Result<String, Interrupt<String>> {
  let fetches = fetches.clone();
  let body = cache
    .resolve(move || fetch_document(id, fetches), deps!["document", id])
    .read()?;
  Ok(format!("<article>{}</article>", body))
}

#[tokio::main]
async fn main() {
  let fetches = Arc::new(AtomicUsize::new(0));
  let cache = SuspenseCache::builder()
    .name("documents")
    .build()
    .expect("Failed to build suspense cache");

  println!("--- Rendering document 42 from 5 tasks at once ---");
  let mut tasks = Vec::new();
  for i in 0..5 {
    let cache = cache.clone();
    let fetches = fetches.clone();
    tasks.push(tokio::spawn(async move {
      let html = host::run(|| render(&cache, 42, &fetches)).await;
      println!("[Task {}] {:?}", i, html);
    }));
  }
  for task in tasks {
    task.await.unwrap();
  }
  println!("Store was hit {} time(s).", fetches.load(Ordering::SeqCst));

  println!("\n--- Rendering a missing document twice ---");
  for _ in 0..2 {
    let result = host::run(|| render(&cache, 0, &fetches)).await;
    println!("{:?}", result);
  }
  println!("Store was hit {} time(s) in total.", fetches.load(Ordering::SeqCst));

  println!("\nCache metrics: {:#?}", cache.metrics());
}
