//! Orchestrator hot-path benchmark over in-memory tiers.
//!
//! Measures the cost of the sequencing machinery itself: every tier is a
//! `MemoryTier`, so the numbers exclude disk and network latency.

use criterion::{criterion_group, criterion_main, Criterion};
use record_store::{MemoryTier, Record, RecordStore, RecordTier, StoreOptions};
use tokio::runtime::Runtime;

fn populated_tier(rt: &Runtime, count: usize) -> MemoryTier {
    let records: Vec<Record> = (0..count).map(|i| Record::new(format!("r-{i}"))).collect();
    let tier = MemoryTier::new();
    rt.block_on(tier.save_all(&records)).unwrap();
    tier
}

fn bench_fetch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    // Memory hit: the unforced fast path.
    let store = RecordStore::with_tiers(
        populated_tier(&rt, 1_000),
        MemoryTier::new(),
        MemoryTier::new(),
        StoreOptions::default(),
    );
    c.bench_function("unforced_fetch_memory_hit_1k", |b| {
        b.iter(|| {
            rt.block_on(async { store.fetch_all(false).first().await.unwrap() })
        })
    });

    // Forced refresh: all three stages plus both repopulations.
    let store = RecordStore::with_tiers(
        MemoryTier::new(),
        populated_tier(&rt, 1_000),
        populated_tier(&rt, 1_000),
        StoreOptions::default(),
    );
    c.bench_function("forced_refresh_1k", |b| {
        b.iter(|| rt.block_on(async { store.fetch_all(true).collect().await.unwrap() }))
    });
}

criterion_group!(benches, bench_fetch);
criterion_main!(benches);
