//! In-memory tier - volatile, process-lifetime record cache.

use crate::error::StoreResult;
use crate::tier::RecordTier;
use crate::types::{Record, RecordCollection};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Volatile in-memory tier.
///
/// Contents live for the process lifetime and are lost on restart. Every
/// operation succeeds; the `StoreResult` returns exist only to satisfy the
/// shared tier contract, and each call completes without suspending.
#[derive(Debug, Default)]
pub struct MemoryTier {
    records: RwLock<Vec<Record>>,
}

impl MemoryTier {
    /// Creates an empty memory tier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently cached.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl RecordTier for MemoryTier {
    async fn fetch_all(&self) -> StoreResult<RecordCollection> {
        Ok(self.records.read().clone())
    }

    async fn save_all(&self, records: &[Record]) -> StoreResult<()> {
        *self.records.write() = records.to_vec();
        Ok(())
    }

    async fn save_one(&self, record: &Record) -> StoreResult<()> {
        let mut records = self.records.write();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.records.write().clear();
        Ok(())
    }
}
