//! Tiered fetch orchestrator.
//!
//! `RecordStore` composes the memory, local and remote tiers into one ordered
//! asynchronous sequence of snapshots and propagates data downward into
//! faster tiers as it is discovered upward.
//!
//! # Tier precedence
//! A fetch walks Memory → Local → Remote, strictly in order. Each stage
//! commits its side effects before its snapshot is observable by the caller:
//! - the local snapshot refills the memory tier,
//! - the remote snapshot replaces both the memory and the local tier.
//!
//! Remote is always authoritative: stage 3 clobbers whatever earlier stages
//! held rather than merging with it.

use crate::error::{StoreError, StoreResult};
use crate::tier::{LocalTier, MemoryTier, RecordTier, RemoteConfig, RemoteTier};
use crate::types::{Record, RecordCollection};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

// ================================================================================================
// CONFIGURATION
// ================================================================================================

/// Options tuning orchestrator behavior.
#[derive(Clone, Debug, Default)]
pub struct StoreOptions {
    /// Serialize whole invocations (fetch sequences and `save_one`) behind a
    /// per-store gate.
    ///
    /// Off by default: concurrent force-refreshes then interleave their
    /// clear/populate effects on the shared tiers and the last writer wins.
    /// Turning this on trades concurrency for determinism; the gate is held
    /// for the full lifetime of a [`FetchSequence`], so a sequence kept alive
    /// but never dropped blocks every other invocation.
    pub serialize_invocations: bool,
}

/// Configuration for the default Memory/Local/Remote stack.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Path of the local tier's SQLite database.
    pub local_db_path: PathBuf,

    /// Remote tier endpoint settings.
    pub remote: RemoteConfig,

    /// Orchestrator options.
    pub options: StoreOptions,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            local_db_path: PathBuf::from("./var/data/records.db"),
            remote: RemoteConfig::default(),
            options: StoreOptions::default(),
        }
    }
}

// ================================================================================================
// RECORD STORE
// ================================================================================================

/// The record store with the concrete Memory/Local/Remote tier stack.
pub type DefaultRecordStore = RecordStore<MemoryTier, LocalTier, RemoteTier>;

/// Tiered record store.
///
/// Owns its three tiers, acquired once at construction and never swapped.
/// Consumers share one store by reference or `Arc`; there is no process-wide
/// instance.
///
/// # Concurrency
/// Within one invocation at most one tier operation is in flight, and a stage
/// starts only after the previous stage's side effects committed. Across
/// invocations the tiers are shared mutable state with no transactional
/// isolation: two simultaneous force-refreshes may interleave their
/// clear/populate effects. See [`StoreOptions::serialize_invocations`].
#[derive(Debug)]
pub struct RecordStore<M, L, R> {
    memory: M,
    local: L,
    remote: R,

    /// Present only when invocations are serialized.
    gate: Option<Arc<Mutex<()>>>,
}

impl DefaultRecordStore {
    /// Opens the default stack from configuration.
    ///
    /// Fails fast with [`StoreError::PreconditionViolation`] or
    /// [`StoreError::TierUnavailable`] when a collaborator cannot be built.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let local = LocalTier::open(&config.local_db_path)?;
        let remote = RemoteTier::new(config.remote)?;
        Ok(Self::with_tiers(
            MemoryTier::new(),
            local,
            remote,
            config.options,
        ))
    }
}

impl<M, L, R> RecordStore<M, L, R>
where
    M: RecordTier,
    L: RecordTier,
    R: RecordTier,
{
    /// Builds a store from explicitly injected tiers.
    pub fn with_tiers(memory: M, local: L, remote: R, options: StoreOptions) -> Self {
        let gate = options
            .serialize_invocations
            .then(|| Arc::new(Mutex::new(())));
        Self {
            memory,
            local,
            remote,
            gate,
        }
    }

    /// The in-memory tier.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// The durable local tier.
    pub fn local(&self) -> &L {
        &self.local
    }

    /// The remote authority.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    // ============================================================================================
    // FETCH
    // ============================================================================================

    /// Starts a tiered fetch.
    ///
    /// With `force_refresh` every stage emits its snapshot unconditionally,
    /// even when empty or identical to an earlier stage. Without it the
    /// sequence emits only the first non-empty snapshot found scanning
    /// Memory → Local → Remote and then terminates; when every tier is empty
    /// it terminates with zero emissions and no error, which callers must
    /// treat as a valid "no data anywhere" result.
    ///
    /// Stages run lazily: no tier is touched until the sequence is polled.
    pub fn fetch_all(&self, force_refresh: bool) -> FetchSequence<'_, M, L, R> {
        FetchSequence {
            store: self,
            stage: Stage::Memory,
            force_refresh,
            gate: None,
        }
    }

    // ============================================================================================
    // WRITE-THROUGH
    // ============================================================================================

    /// Saves one record through all three tiers.
    ///
    /// The remote save is issued first; the memory and local tiers are
    /// written only after the authority acknowledges. When the remote save
    /// fails no tier is mutated. Completion carries no payload: this exists
    /// so callers can await durability.
    pub async fn save_one(&self, record: &Record) -> StoreResult<()> {
        let _gate = match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        self.remote.save_one(record).await?;
        self.memory.save_one(record).await?;
        self.local.save_one(record).await?;

        debug!("record `{}` written through all tiers", record.id);
        Ok(())
    }

    // ============================================================================================
    // RESERVED OPERATIONS
    // ============================================================================================

    /// Reserved. Declared to satisfy the repository capability set; the
    /// deletion semantics across tiers are not committed yet, so this mutates
    /// nothing and always returns [`StoreError::Unsupported`].
    pub async fn delete_one(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::Unsupported("delete_one"))
    }

    /// Reserved fire-and-forget save. See [`RecordStore::delete_one`]; use
    /// [`RecordStore::save_one`] to await a durable write-through.
    pub async fn save(&self, _record: &Record) -> StoreResult<()> {
        Err(StoreError::Unsupported("save"))
    }
}

// ================================================================================================
// FETCH SEQUENCE
// ================================================================================================

#[derive(Clone, Copy, Debug)]
enum Stage {
    Memory,
    Local,
    Remote,
    Done,
}

/// Lazy, finite, non-restartable sequence of tier snapshots.
///
/// Stages execute only when polled, strictly in Memory → Local → Remote
/// order. Dropping the sequence issues no further tier operations; side
/// effects of stages already driven stay committed. A tier failure is emitted
/// as that stage's terminal `Err`, after which `next` returns `None`.
#[must_use = "a fetch sequence does nothing until polled"]
pub struct FetchSequence<'a, M, L, R> {
    store: &'a RecordStore<M, L, R>,
    stage: Stage,
    force_refresh: bool,

    /// Invocation gate, held from the first poll until drop.
    gate: Option<OwnedMutexGuard<()>>,
}

impl<M, L, R> FetchSequence<'_, M, L, R>
where
    M: RecordTier,
    L: RecordTier,
    R: RecordTier,
{
    /// Drives the sequence to its next emission.
    ///
    /// Returns `None` once the sequence is exhausted - including the
    /// all-tiers-empty case of an unforced fetch, which yields no emission
    /// at all.
    pub async fn next(&mut self) -> Option<StoreResult<RecordCollection>> {
        if matches!(self.stage, Stage::Memory) && self.gate.is_none() {
            if let Some(gate) = &self.store.gate {
                self.gate = Some(Arc::clone(gate).lock_owned().await);
            }
        }

        loop {
            let outcome = match self.stage {
                Stage::Memory => {
                    self.stage = Stage::Local;
                    self.store.memory.fetch_all().await
                }
                Stage::Local => {
                    self.stage = Stage::Remote;
                    self.local_stage().await
                }
                Stage::Remote => {
                    self.stage = Stage::Done;
                    self.remote_stage().await
                }
                Stage::Done => return None,
            };

            match outcome {
                Ok(snapshot) => {
                    if self.force_refresh {
                        return Some(Ok(snapshot));
                    }
                    if !snapshot.is_empty() {
                        self.stage = Stage::Done;
                        return Some(Ok(snapshot));
                    }
                    // Unforced and empty: consult the next tier without
                    // emitting.
                }
                Err(err) => {
                    // Terminal. No retry, no fallback to a slower tier: a
                    // skipped stage could serve stale data while reporting
                    // success.
                    self.stage = Stage::Done;
                    return Some(Err(err));
                }
            }
        }
    }

    /// Local snapshot; the memory tier is cleared and repopulated with it
    /// before the snapshot is emitted.
    async fn local_stage(&self) -> StoreResult<RecordCollection> {
        let snapshot = self.store.local.fetch_all().await?;
        self.store.memory.delete_all().await?;
        self.store.memory.save_all(&snapshot).await?;
        debug!("memory tier repopulated from local ({} records)", snapshot.len());
        Ok(snapshot)
    }

    /// Remote snapshot; memory and local contents are replaced with it
    /// before the snapshot is emitted. Last writer wins - the authority
    /// clobbers stale cached state.
    async fn remote_stage(&self) -> StoreResult<RecordCollection> {
        let snapshot = self.store.remote.fetch_all().await?;
        self.store.memory.delete_all().await?;
        self.store.local.delete_all().await?;
        self.store.memory.save_all(&snapshot).await?;
        self.store.local.save_all(&snapshot).await?;
        info!(
            "remote snapshot of {} records replaced memory and local tiers",
            snapshot.len()
        );
        Ok(snapshot)
    }

    /// Drains the sequence, collecting every emission.
    ///
    /// Stops at the first stage failure.
    pub async fn collect(mut self) -> StoreResult<Vec<RecordCollection>> {
        let mut snapshots = Vec::new();
        while let Some(result) = self.next().await {
            snapshots.push(result?);
        }
        Ok(snapshots)
    }

    /// First emission of the sequence, if any.
    pub async fn first(mut self) -> StoreResult<Option<RecordCollection>> {
        self.next().await.transpose()
    }
}
