// Single-pass aggregation of raw requests into window metrics.
// Pure: no I/O, no clock. Persistence lives in snapshot_store.

use std::collections::BTreeMap;

use chrono::Timelike;

use crate::models::{Distributions, Metrics, RawRecord, RequestStatus, TechnicianPerformance, Totals};

/// Running sum and sample count; `mean` is 0 for an empty sample.
#[derive(Debug, Clone, Copy, Default)]
struct RunningMean {
    sum: f64,
    count: u64,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }
}

/// Per-technician running stats; created on first sighting of a technician.
#[derive(Debug, Clone, Copy, Default)]
struct TechnicianAccumulator {
    total_requests: u64,
    completed_requests: u64,
    total_resolution_time: f64,
}

impl TechnicianAccumulator {
    fn finish(self) -> TechnicianPerformance {
        let avg_resolution_time = if self.completed_requests > 0 {
            self.total_resolution_time / self.completed_requests as f64
        } else {
            0.0
        };
        TechnicianPerformance {
            total_requests: self.total_requests,
            completed_requests: self.completed_requests,
            total_resolution_time: self.total_resolution_time,
            avg_resolution_time,
        }
    }
}

/// Accumulates records one at a time; `finish` converts to the output shape.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    total_requests: u64,
    by_status: BTreeMap<RequestStatus, u64>,
    by_technician: BTreeMap<String, u64>,
    by_hour: BTreeMap<u32, u64>,
    assign_time: RunningMean,
    resolution_time: RunningMean,
    technicians: BTreeMap<String, TechnicianAccumulator>,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &RawRecord) {
        self.total_requests += 1;
        *self.by_status.entry(record.status).or_default() += 1;
        *self.by_hour.entry(record.created_at.hour()).or_default() += 1;

        if let Some(secs) = record.assign_time_secs() {
            self.assign_time.push(secs);
        }
        let resolution = record.resolution_time_secs();
        if let Some(secs) = resolution {
            self.resolution_time.push(secs);
        }

        if record.assigned_technician().is_none() {
            return;
        }
        let name = record.technician_name.as_str();
        *self.by_technician.entry(name.to_string()).or_default() += 1;

        let tech = self.technicians.entry(name.to_string()).or_default();
        tech.total_requests += 1;
        if record.status == RequestStatus::Closed {
            tech.completed_requests += 1;
        }
        if let Some(secs) = resolution {
            tech.total_resolution_time += secs;
        }
    }

    pub fn finish(self) -> Metrics {
        Metrics {
            totals: Totals {
                total_requests: self.total_requests,
                avg_assign_time: self.assign_time.mean(),
                avg_resolution_time: self.resolution_time.mean(),
            },
            distributions: Distributions {
                requests_by_status: self
                    .by_status
                    .into_iter()
                    .map(|(status, n)| (status.as_str().to_string(), n))
                    .collect(),
                requests_by_technician: self.by_technician,
                requests_by_hour: self.by_hour,
            },
            per_technician: self
                .technicians
                .into_iter()
                .map(|(name, acc)| (name, acc.finish()))
                .collect(),
        }
    }
}

/// Computes metrics for a batch of records in any order.
pub fn calculate_metrics<'a, I>(records: I) -> Metrics
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut acc = MetricsAccumulator::new();
    for record in records {
        acc.push(record);
    }
    acc.finish()
}
