//! Record tiers consulted by the orchestrator.
//!
//! Three-tier architecture:
//! - **Memory**: process-lifetime `Vec` behind a lock (fastest, volatile)
//! - **Local**: SQLite database on disk (survives restarts)
//! - **Remote**: HTTP authority (slowest, always correct)
//!
//! The orchestrator consults tiers in that order and copies results downward
//! into faster tiers as fresher data arrives upward.

pub mod local;
pub mod memory;
pub mod remote;

pub use local::LocalTier;
pub use memory::MemoryTier;
pub use remote::{RemoteConfig, RemoteTier};

use crate::error::StoreResult;
use crate::types::{Record, RecordCollection};
use async_trait::async_trait;
use std::sync::Arc;

/// Capability set every tier implements.
///
/// `save_all` is a full replace of the tier's managed key space, never a
/// merge. Callers needing an incremental update go through `save_one`, or
/// fetch, modify and save the whole collection.
#[async_trait]
pub trait RecordTier: Send + Sync {
    /// One snapshot of the tier's full contents.
    async fn fetch_all(&self) -> StoreResult<RecordCollection>;

    /// Replaces the tier's contents with `records`.
    async fn save_all(&self, records: &[Record]) -> StoreResult<()>;

    /// Upserts a single record by id.
    async fn save_one(&self, record: &Record) -> StoreResult<()>;

    /// Removes every record from the tier.
    async fn delete_all(&self) -> StoreResult<()>;
}

// Tiers are shared mutable state across orchestrator invocations, so an
// `Arc`-wrapped tier is itself a tier.
#[async_trait]
impl<T: RecordTier + ?Sized> RecordTier for Arc<T> {
    async fn fetch_all(&self) -> StoreResult<RecordCollection> {
        (**self).fetch_all().await
    }

    async fn save_all(&self, records: &[Record]) -> StoreResult<()> {
        (**self).save_all(records).await
    }

    async fn save_one(&self, record: &Record) -> StoreResult<()> {
        (**self).save_one(record).await
    }

    async fn delete_all(&self) -> StoreResult<()> {
        (**self).delete_all().await
    }
}
