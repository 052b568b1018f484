//! Local tier - durable SQLite-backed record cache.
//!
//! First persistence-backed fallback after the memory tier; contents survive
//! process restarts until explicitly deleted or replaced by a fresher remote
//! snapshot. Statements run on the blocking thread pool so tier calls never
//! stall the async reactor.

use crate::error::{StoreError, StoreResult};
use crate::tier::RecordTier;
use crate::types::{Record, RecordCollection};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS records (
    id TEXT PRIMARY KEY,
    attributes TEXT NOT NULL,
    position INTEGER NOT NULL
)";

// New ids append after the current maximum position; an existing id keeps its
// position so upserts do not reorder the collection.
const UPSERT_SQL: &str = "INSERT INTO records (id, attributes, position)
     VALUES (
         ?1,
         ?2,
         COALESCE(
             (SELECT position FROM records WHERE id = ?1),
             (SELECT COALESCE(MAX(position), -1) + 1 FROM records)
         )
     )
     ON CONFLICT(id) DO UPDATE SET attributes = excluded.attributes";

/// Durable local tier backed by a single SQLite file.
pub struct LocalTier {
    /// Connection shared with the blocking pool.
    conn: Arc<Mutex<Connection>>,

    /// Path to the database file.
    path: PathBuf,
}

impl std::fmt::Debug for LocalTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTier").field("path", &self.path).finish()
    }
}

impl LocalTier {
    /// Opens or creates the local tier database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::TierUnavailable(format!("failed to create directory: {e}"))
                })?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs a statement batch on the blocking pool against the shared
    /// connection.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || f(&mut conn.lock()))
            .await
            .map_err(|e| StoreError::TierUnavailable(format!("storage task failed: {e}")))?
    }
}

fn decode_row(id: String, attributes: String) -> StoreResult<Record> {
    let attributes: Map<String, Value> = serde_json::from_str(&attributes).map_err(|e| {
        StoreError::TierUnavailable(format!("corrupt attribute payload for `{id}`: {e}"))
    })?;
    Ok(Record { id, attributes })
}

fn encode_attributes(record: &Record) -> StoreResult<String> {
    serde_json::to_string(&record.attributes).map_err(|e| {
        StoreError::TierUnavailable(format!("failed to encode attributes for `{}`: {e}", record.id))
    })
}

#[async_trait]
impl RecordTier for LocalTier {
    async fn fetch_all(&self) -> StoreResult<RecordCollection> {
        self.with_conn(|conn: &mut Connection| {
            let mut stmt = conn.prepare("SELECT id, attributes FROM records ORDER BY position")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (id, attributes) = row?;
                records.push(decode_row(id, attributes)?);
            }
            Ok(records)
        })
        .await
    }

    async fn save_all(&self, records: &[Record]) -> StoreResult<()> {
        let records = records.to_vec();
        let count = records.len();

        self.with_conn(move |conn: &mut Connection| {
            // Delete plus re-insert in one transaction: replace semantics with
            // no partial-write visibility.
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM records", [])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO records (id, attributes, position) VALUES (?1, ?2, ?3)",
                )?;
                for (position, record) in records.iter().enumerate() {
                    let attributes = encode_attributes(record)?;
                    stmt.execute(params![record.id, attributes, position as i64])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await?;

        debug!("local tier replaced with {} records", count);
        Ok(())
    }

    async fn save_one(&self, record: &Record) -> StoreResult<()> {
        let id = record.id.clone();
        let attributes = encode_attributes(record)?;

        self.with_conn(move |conn: &mut Connection| {
            conn.execute(UPSERT_SQL, params![id, attributes])?;
            Ok(())
        })
        .await
    }

    async fn delete_all(&self) -> StoreResult<()> {
        let deleted = self
            .with_conn(|conn: &mut Connection| Ok(conn.execute("DELETE FROM records", [])?))
            .await?;
        debug!("local tier cleared ({deleted} records deleted)");
        Ok(())
    }
}
