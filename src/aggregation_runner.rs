// Orchestration per window: fetch → compute → persist → RunResult.
// Windows are processed strictly one after another; a failed window never blocks the next.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{error, info, instrument};

use crate::backfill;
use crate::config::RunMode;
use crate::dashboard;
use crate::document_store::DocumentStore;
use crate::error::Result;
use crate::metrics::calculate_metrics;
use crate::models::{DashboardSummary, MetricsSnapshot, RunResult, TimeWindow};
use crate::snapshot_store::{SnapshotStore, key};
use crate::time_window::WindowCalculator;

pub struct AggregationRunner<S> {
    store: SnapshotStore<S>,
    windows: WindowCalculator,
}

impl<S: DocumentStore> AggregationRunner<S> {
    pub fn new(store: SnapshotStore<S>, windows: WindowCalculator) -> Self {
        Self { store, windows }
    }

    pub fn store(&self) -> &SnapshotStore<S> {
        &self.store
    }

    pub fn windows(&self) -> &WindowCalculator {
        &self.windows
    }

    /// Entry point for one invocation. An explicit start forces single-window mode and is
    /// the only invocation-fatal input (`MalformedTimestamp`).
    pub async fn run(&self, mode: RunMode, explicit_start: Option<&str>) -> Result<Vec<RunResult>> {
        self.run_at(mode, explicit_start, Utc::now()).await
    }

    pub async fn run_at(
        &self,
        mode: RunMode,
        explicit_start: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RunResult>> {
        if let Some(start) = explicit_start {
            let window = self.windows.window_from_explicit_start(start)?;
            return Ok(vec![self.run_window(window, None, now).await]);
        }
        match mode {
            RunMode::Single => Ok(vec![self.run_current_at(now).await]),
            RunMode::Backfill => Ok(backfill::run_backfill_at(self, now).await),
        }
    }

    /// Aggregates the window containing `now`.
    pub async fn run_current_at(&self, now: DateTime<Utc>) -> RunResult {
        let window = self.windows.current_window_at(now);
        self.run_window(window, None, now).await
    }

    /// Aggregates an arbitrary window under a `custom_` key so it never replaces a
    /// regularly keyed snapshot or moves the backfill marker.
    pub async fn run_custom_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RunResult {
        let window = TimeWindow { start, end };
        let custom_key = format!("{}{}", key::CUSTOM_KEY_PREFIX, key::window_key(&window));
        self.run_window(window, Some(&custom_key), now).await
    }

    /// Fetch, compute and persist one window. Fetch problems were already degraded to an empty
    /// batch; only persistence can fail here, and it is reported in the result.
    #[instrument(skip(self, window, explicit_key), fields(window = %window))]
    pub async fn run_window(
        &self,
        window: TimeWindow,
        explicit_key: Option<&str>,
        now: DateTime<Utc>,
    ) -> RunResult {
        info!("aggregating window");
        let records = self.store.fetch_records(&window).await;
        info!(fetched = records.len(), "fetched requests");

        let metrics = calculate_metrics(&records);
        let snapshot = MetricsSnapshot::new(window, now, metrics);

        match self.store.persist(&snapshot, explicit_key).await {
            Ok(doc_id) => {
                info!(
                    doc_id = %doc_id,
                    total_requests = snapshot.metrics.totals.total_requests,
                    avg_assign_time = snapshot.metrics.totals.avg_assign_time,
                    avg_resolution_time = snapshot.metrics.totals.avg_resolution_time,
                    "aggregation complete"
                );
                RunResult::succeeded(window, doc_id, &snapshot.metrics)
            }
            Err(e) => {
                error!(error = %e, "aggregation failed");
                RunResult::failed(window, e)
            }
        }
    }

    /// Rollup of every snapshot that starts on the local day containing `now`.
    pub async fn daily_dashboard_at(&self, now: DateTime<Utc>) -> Result<DashboardSummary> {
        let day_start = self.windows.start_of_day_at(now);
        let day_end = day_start + TimeDelta::days(1);
        let snapshots = self.store.snapshots_between(day_start, day_end).await?;
        Ok(dashboard::summarize(snapshots.iter().map(|(_, s)| s)))
    }
}
