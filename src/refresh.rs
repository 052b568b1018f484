//! Scheduled refresh - background task for periodic remote synchronization.
//!
//! Event-driven callers force a refresh through [`RecordStore::fetch_all`]
//! directly; the scheduler exists so a long-running process converges to the
//! remote authority's state even when nobody asks, repopulating the memory
//! and local tiers on a fixed interval.
//!
//! A refresh pass drives one forced fetch sequence to completion, so it
//! carries the same side effects as any forced fetch: after a successful pass
//! both cache tiers equal the remote snapshot. Failures are logged and the
//! loop keeps running; the next tick retries from scratch.

use crate::error::StoreResult;
use crate::store::RecordStore;
use crate::tier::RecordTier;
use crate::types::now_ms;
use log::{error, info};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Configuration for the scheduled refresh task.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between refresh passes.
    pub refresh_interval: Duration,

    /// Whether the scheduler runs at all.
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(15 * 60),
            enabled: true,
        }
    }
}

/// Statistics from one refresh pass.
#[derive(Debug, Clone)]
pub struct RefreshStats {
    /// Records held by the cache tiers after the remote snapshot applied.
    pub records_refreshed: usize,

    /// Duration of the pass in milliseconds.
    pub duration_ms: u64,

    /// Completion timestamp (ms since UNIX epoch).
    pub timestamp: u64,
}

/// Periodic background refresher.
///
/// Spawn with `tokio::spawn(Arc::clone(&scheduler).start())` during process
/// initialization.
pub struct RefreshScheduler<M, L, R> {
    store: Arc<RecordStore<M, L, R>>,
    config: SchedulerConfig,
    last_refresh_at: Arc<RwLock<u64>>,
}

impl<M, L, R> RefreshScheduler<M, L, R>
where
    M: RecordTier,
    L: RecordTier,
    R: RecordTier,
{
    /// Creates a scheduler over a shared store.
    pub fn new(store: Arc<RecordStore<M, L, R>>, config: SchedulerConfig) -> Self {
        Self {
            store,
            config,
            last_refresh_at: Arc::new(RwLock::new(now_ms())),
        }
    }

    /// Timestamp of the last successful refresh, or the scheduler's creation
    /// time when none has completed yet.
    pub fn last_refresh(&self) -> u64 {
        *self.last_refresh_at.read()
    }

    /// Runs the scheduler loop. Never returns while enabled; returns
    /// immediately when disabled in config.
    pub async fn start(self: Arc<Self>) {
        if !self.config.enabled {
            info!("scheduled refresh is disabled, skipping");
            return;
        }

        info!(
            "starting scheduled refresh with {}-second interval",
            self.config.refresh_interval.as_secs()
        );

        let mut ticker = interval(self.config.refresh_interval);

        loop {
            ticker.tick().await;
            self.do_refresh().await;
        }
    }

    /// One tick: refresh, log, never panic the loop.
    async fn do_refresh(&self) {
        match self.refresh_once().await {
            Ok(stats) => {
                info!(
                    "scheduled refresh completed: {} records in {}ms",
                    stats.records_refreshed, stats.duration_ms
                );
                *self.last_refresh_at.write() = stats.timestamp;
            }
            Err(e) => {
                error!("scheduled refresh failed: {e}");
            }
        }
    }

    /// Drives one forced fetch sequence to completion.
    ///
    /// The last emission is the remote snapshot, so `records_refreshed`
    /// reports what the cache tiers now hold.
    pub async fn refresh_once(&self) -> StoreResult<RefreshStats> {
        let start = now_ms();

        let mut sequence = self.store.fetch_all(true);
        let mut records_refreshed = 0;
        while let Some(snapshot) = sequence.next().await {
            records_refreshed = snapshot?.len();
        }

        Ok(RefreshStats {
            records_refreshed,
            duration_ms: now_ms() - start,
            timestamp: now_ms(),
        })
    }
}
