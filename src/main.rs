use anyhow::Result;
use service_metrics::aggregation_runner::AggregationRunner;
use service_metrics::config::AppConfig;
use service_metrics::document_store::SqliteDocumentStore;
use service_metrics::snapshot_store::SnapshotStore;
use service_metrics::time_window::WindowCalculator;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let app_config = AppConfig::load()?;
    let agg = &app_config.aggregation;

    let store =
        SqliteDocumentStore::connect(&app_config.database.path, app_config.database.max_pool_size)
            .await?;
    store.init().await?;

    let runner = AggregationRunner::new(
        SnapshotStore::new(store, &agg.records_collection, &agg.snapshots_collection),
        WindowCalculator::from_config(agg)?,
    );

    // Reproducible runs: an explicit window start overrides the configured mode.
    let explicit_start = std::env::var("INTERVAL_START")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let results = runner.run(agg.mode, explicit_start.as_deref()).await?;

    for result in &results {
        tracing::info!(result = %serde_json::to_string(result)?, "run result");
    }
    let failed = results.iter().filter(|r| !r.success).count();
    anyhow::ensure!(
        failed == 0,
        "{} of {} windows failed to aggregate",
        failed,
        results.len()
    );
    Ok(())
}
