// Dump recent service_metrics snapshots and today's dashboard rollup as JSON.
//
// Usage: cargo run --example dump_metrics -- [DB_PATH] [LIMIT]
//   DB_PATH  default: ./data/metrics.db
//   LIMIT    default: 5

use chrono::Utc;
use service_metrics::aggregation_runner::AggregationRunner;
use service_metrics::config::AggregationConfig;
use service_metrics::document_store::SqliteDocumentStore;
use service_metrics::snapshot_store::SnapshotStore;
use service_metrics::time_window::WindowCalculator;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or("./data/metrics.db");
    let limit: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(5);

    let config = AggregationConfig::default();
    let store = SqliteDocumentStore::connect(path, 1).await?;
    store.init().await?;
    let runner = AggregationRunner::new(
        SnapshotStore::new(store, &config.records_collection, &config.snapshots_collection),
        WindowCalculator::from_config(&config)?,
    );

    let recent = runner.store().recent_snapshots(limit).await?;
    for (id, snapshot) in &recent {
        println!("{}: {}", id, serde_json::to_string_pretty(snapshot)?);
    }

    let summary = runner.daily_dashboard_at(Utc::now()).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
