//! Example: wiring the tiered record store into an application.
//!
//! Demonstrates the full lifecycle against a live record service:
//! a cold unforced fetch, a forced refresh, a write-through save and a
//! background refresh scheduler.
//!
//! The remote endpoint defaults to `http://localhost:8000/api/v1` and can be
//! overridden with the `RECORD_SERVICE_URL` environment variable.
//!
//! Run with: `cargo run --example store_walkthrough`

use record_store::{
    Record, RecordStore, RefreshScheduler, RemoteConfig, SchedulerConfig, StoreConfig,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=================================================");
    println!("  Tiered Record Store Walkthrough               ");
    println!("=================================================");
    println!();

    let base_url = std::env::var("RECORD_SERVICE_URL")
        .unwrap_or_else(|_| "http://localhost:8000/api/v1".to_string());

    let config = StoreConfig {
        remote: RemoteConfig {
            base_url: base_url.clone(),
            ..RemoteConfig::default()
        },
        ..StoreConfig::default()
    };

    println!("Opening store:");
    println!("  - Local database: {}", config.local_db_path.display());
    println!("  - Remote service: {}", base_url);
    println!();

    let store = Arc::new(RecordStore::open(config)?);

    // 1. Unforced fetch: first non-empty snapshot, fastest tier first.
    println!("1. Unforced fetch (first non-empty tier wins):");
    match store.fetch_all(false).first().await {
        Ok(Some(snapshot)) => println!("   ✓ {} records served from cache or remote", snapshot.len()),
        Ok(None) => println!("   ✓ no data anywhere (valid empty result)"),
        Err(e) => println!("   ✗ fetch failed: {}", e),
    }
    println!();

    // 2. Forced refresh: all three stages, remote wins.
    println!("2. Forced refresh (all tiers, remote replaces caches):");
    let mut sequence = store.fetch_all(true);
    let mut stage = 0;
    while let Some(outcome) = sequence.next().await {
        stage += 1;
        match outcome {
            Ok(snapshot) => println!("   stage {}: {} records", stage, snapshot.len()),
            Err(e) => {
                println!("   stage {}: failed ({})", stage, e);
                break;
            }
        }
    }
    drop(sequence);
    println!("   memory tier now holds {} records", store.memory().len());
    println!();

    // 3. Write-through save, gated on the remote acknowledgment.
    println!("3. Write-through save:");
    let mut record = Record::new(Uuid::new_v4().to_string());
    record
        .attributes
        .insert("title".to_string(), serde_json::json!("walkthrough"));
    match store.save_one(&record).await {
        Ok(()) => println!("   ✓ record `{}` durable in all tiers", record.id),
        Err(e) => println!("   ✗ save failed, no tier mutated: {}", e),
    }
    println!();

    // 4. Background refresh scheduler.
    println!("4. Spawning refresh scheduler (60-second interval):");
    let scheduler = Arc::new(RefreshScheduler::new(
        Arc::clone(&store),
        SchedulerConfig {
            refresh_interval: Duration::from_secs(60),
            enabled: true,
        },
    ));
    {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move {
            scheduler.start().await;
        });
    }
    println!("   ✓ scheduler running; last refresh at {}", scheduler.last_refresh());
    println!();

    println!("=================================================");
    println!("  Walkthrough Complete                          ");
    println!("=================================================");

    Ok(())
}
