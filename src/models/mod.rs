// Domain models: windows, raw service requests, computed snapshots, run results.

mod dashboard;
mod record;
mod run_result;
mod snapshot;
mod window;

pub use dashboard::{DashboardSummary, TechnicianCount};
pub use record::{RawRecord, RequestStatus};
pub use run_result::{MetricsSummary, RunResult};
pub use snapshot::{
    Distributions, Metrics, MetricsSnapshot, SnapshotDocument, TechnicianPerformance, Totals,
};
pub use window::TimeWindow;
