use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for the cache.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub struct Metrics {
  // --- Lookups ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) failures_served: CachePadded<AtomicU64>,
  pub(crate) suspensions: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,

  // --- Settlement ---
  pub(crate) settled_ok: CachePadded<AtomicU64>,
  pub(crate) settled_err: CachePadded<AtomicU64>,
  pub(crate) abandoned: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      failures_served: CachePadded::new(AtomicU64::new(0)),
      suspensions: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      settled_ok: CachePadded::new(AtomicU64::new(0)),
      settled_err: CachePadded::new(AtomicU64::new(0)),
      abandoned: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn incr(counter: &CachePadded<AtomicU64>) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self, entries: usize) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let failures_served = self.failures_served.load(Ordering::Relaxed);
    let suspensions = self.suspensions.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + failures_served + suspensions + misses;

    MetricsSnapshot {
      hits,
      failures_served,
      suspensions,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      settled_ok: self.settled_ok.load(Ordering::Relaxed),
      settled_err: self.settled_err.load(Ordering::Relaxed),
      abandoned: self.abandoned.load(Ordering::Relaxed),
      entries: entries as u64,
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of the cache's metrics.
#[derive(Clone, serde::Serialize)]
pub struct MetricsSnapshot {
  /// Lookups answered with a completed value.
  pub hits: u64,
  /// Lookups answered with a stored failure.
  pub failures_served: u64,
  /// Lookups that found an existing entry still pending.
  pub suspensions: u64,
  /// Lookups that created an entry; equals the number of factory invocations.
  pub misses: u64,
  /// hits / all lookups.
  pub hit_ratio: f64,
  /// Operations that completed successfully.
  pub settled_ok: u64,
  /// Operations that completed with a failure.
  pub settled_err: u64,
  /// Operations dropped before producing a result.
  pub abandoned: u64,
  /// Entries currently held. Never decreases.
  pub entries: u64,
  /// The number of seconds the cache has been running.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("failures_served", &self.failures_served)
      .field("suspensions", &self.suspensions)
      .field("misses", &self.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("settled_ok", &self.settled_ok)
      .field("settled_err", &self.settled_err)
      .field("abandoned", &self.abandoned)
      .field("entries", &self.entries)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
