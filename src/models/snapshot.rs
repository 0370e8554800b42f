// Computed metrics for one window and the persisted document shape.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// Scalar totals for one window. Averages are in seconds and 0 when there were no samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_requests: u64,
    pub avg_assign_time: f64,
    pub avg_resolution_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distributions {
    pub requests_by_status: BTreeMap<String, u64>,
    /// Assigned requests only, keyed by technician name.
    pub requests_by_technician: BTreeMap<String, u64>,
    /// Keyed by hour of `createdAt` (0-23) as stored.
    pub requests_by_hour: BTreeMap<u32, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicianPerformance {
    pub total_requests: u64,
    pub completed_requests: u64,
    pub total_resolution_time: f64,
    pub avg_resolution_time: f64,
}

/// Everything computed from one batch of raw records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub totals: Totals,
    pub distributions: Distributions,
    pub per_technician: BTreeMap<String, TechnicianPerformance>,
}

/// Immutable result for exactly one window.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub window: TimeWindow,
    pub generated_at: DateTime<Utc>,
    pub metrics: Metrics,
}

impl MetricsSnapshot {
    pub fn new(window: TimeWindow, generated_at: DateTime<Utc>, metrics: Metrics) -> Self {
        Self {
            window,
            generated_at,
            metrics,
        }
    }

    pub fn to_document(&self) -> SnapshotDocument {
        SnapshotDocument {
            interval_start: iso(self.window.start),
            interval_end: iso(self.window.end),
            generated_at: iso(self.generated_at),
            metrics: self.metrics.clone(),
        }
    }
}

/// Stored body in the snapshots collection. Timestamps are RFC 3339 strings in UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub interval_start: String,
    pub interval_end: String,
    pub generated_at: String,
    pub metrics: Metrics,
}

impl SnapshotDocument {
    /// Parses `interval_end` back into an instant; None when the stored string is not RFC 3339.
    pub fn interval_end_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.interval_end)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
