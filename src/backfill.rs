// Catch-up: every window between the last persisted snapshot and now, then the current window.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::aggregation_runner::AggregationRunner;
use crate::document_store::DocumentStore;
use crate::models::RunResult;

/// Processes missed windows oldest first, then always the current window. The last-processed
/// marker is read once and snapped down onto the window grid; with no prior snapshot (or an
/// unreadable marker) catch-up starts at local midnight. Per-window failures are reported and
/// the loop moves on.
pub async fn run_backfill_at<S: DocumentStore>(
    runner: &AggregationRunner<S>,
    now: DateTime<Utc>,
) -> Vec<RunResult> {
    let windows = runner.windows();
    let current = windows.current_window_at(now);

    let last_end = match runner.store().last_processed_window_end().await {
        Ok(Some(end)) => end,
        Ok(None) => {
            info!("no previous snapshot, backfilling from start of day");
            windows.start_of_day_at(now)
        }
        Err(e) => {
            warn!(error = %e, "could not read last processed window, backfilling from start of day");
            windows.start_of_day_at(now)
        }
    };

    // Explicit-start runs can leave an off-grid marker; resume from the grid window holding it.
    let resume_from = windows.grid_floor(last_end);
    if resume_from != last_end {
        info!(marker = %last_end, resume_from = %resume_from, "last processed end is off the window grid");
    }

    let missing = windows.missing_windows(resume_from, current.start);
    let mut results = Vec::with_capacity(missing.size_hint().0 + 1);
    if missing.size_hint().0 == 0 {
        info!("no missed intervals to backfill");
    }
    for window in missing {
        info!(window = %window, "backfilling window");
        results.push(runner.run_window(window, None, now).await);
    }

    info!(window = %current, "aggregating current window");
    results.push(runner.run_window(current, None, now).await);

    let failed = results.iter().filter(|r| !r.success).count();
    info!(processed = results.len(), failed, "backfill complete");
    results
}
