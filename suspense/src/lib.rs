//! A suspending, memoizing cache for asynchronous values.
//!
//! # Features
//! - **At-most-once**: one factory run per distinct dependency list, shared
//!   by every caller, however many race for it.
//! - **Explicit suspension**: lookups return a [`Resolution`] of
//!   `Ready`, `Failed` or `Pending`; a pending handle can be awaited or
//!   blocked on, and the [`host`] loop re-enters the work afterwards.
//! - **Sticky outcomes**: values and failures are stored once and handed out
//!   as the same `Arc` for the lifetime of the cache.
//! - **Sync & Async**: factories can be futures (driven by a [`TaskSpawner`])
//!   or blocking closures (run on their own thread).
//!
//! # Example
//!
//! ```
//! use paper_suspense::{host, Interrupt, SuspenseCache, ThreadSpawner};
//! use std::sync::Arc;
//!
//! let cache: SuspenseCache<String, std::io::Error> = SuspenseCache::builder()
//!   .spawner(Arc::new(ThreadSpawner))
//!   .build()
//!   .unwrap();
//!
//! let title = host::run_blocking(|| -> Result<String, Interrupt<std::io::Error>> {
//!   let title = cache
//!     .resolve(|| async { Ok("Untitled".to_string()) }, ["doc-1"])
//!     .read()?;
//!   Ok(title.to_uppercase())
//! });
//! assert_eq!(title.unwrap(), "UNTITLED");
//! ```

// Public modules that form the API
pub mod builder;
pub mod config;
pub mod deps;
pub mod error;
pub mod handles;
pub mod host;
pub mod metrics;
pub mod resolution;
pub mod runtime;
pub mod signal;

// Internal, crate-only modules
mod entry;
mod shared;

// Re-export the primary user-facing types for convenience
pub use builder::SuspenseCacheBuilder;
pub use config::{RuntimeKind, SuspenseConfig};
pub use deps::{ByAddress, Dep, Deps};
pub use error::{BuildError, ConfigError};
pub use handles::SuspenseCache;
pub use metrics::MetricsSnapshot;
pub use resolution::{Interrupt, Resolution};
pub use runtime::{TaskSpawner, ThreadSpawner};
pub use signal::Suspension;

#[cfg(feature = "tokio")]
pub use runtime::TokioSpawner;
