//! Tiered record store: read-through/write-through caching across three tiers.
//!
//! The store serves a collection of records by consulting, in strict priority
//! order:
//! - **Memory**: process-lifetime cache, fastest, no persistence guarantee
//! - **Local**: SQLite-backed cache, survives restarts
//! - **Remote**: HTTP authority, slowest, always correct
//!
//! Faster tiers are repopulated from slower ones as data arrives: a local
//! snapshot refills memory, a remote snapshot replaces both memory and local.
//! Writes go through the remote authority first and fan out to the cache
//! tiers only after it acknowledges.
//!
//! # Example
//! ```rust,no_run
//! use record_store::{RecordStore, StoreConfig};
//!
//! # async fn run() -> Result<(), record_store::StoreError> {
//! let store = RecordStore::open(StoreConfig::default())?;
//!
//! // First non-empty snapshot, fastest tier first.
//! let mut sequence = store.fetch_all(false);
//! while let Some(snapshot) = sequence.next().await {
//!     println!("{} records", snapshot?.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod refresh;
pub mod store;
pub mod tier;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use refresh::{RefreshScheduler, RefreshStats, SchedulerConfig};
pub use store::{DefaultRecordStore, FetchSequence, RecordStore, StoreConfig, StoreOptions};
pub use tier::{LocalTier, MemoryTier, RecordTier, RemoteConfig, RemoteTier};
pub use types::{now_ms, Record, RecordCollection};
