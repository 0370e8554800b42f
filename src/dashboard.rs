// Rolls many persisted window snapshots into one dashboard view.

use std::collections::BTreeMap;

use crate::models::{DashboardSummary, SnapshotDocument, TechnicianCount};

pub const TOP_TECHNICIANS: usize = 5;

/// Sums counts across snapshots. Averages only include windows whose average is positive,
/// so empty windows do not drag them toward zero.
pub fn summarize<'a, I>(snapshots: I) -> DashboardSummary
where
    I: IntoIterator<Item = &'a SnapshotDocument>,
{
    let mut summary = DashboardSummary::default();
    let mut assign = Vec::new();
    let mut resolution = Vec::new();
    let mut technicians: BTreeMap<String, u64> = BTreeMap::new();

    for snap in snapshots {
        let m = &snap.metrics;
        summary.windows += 1;
        summary.total_requests += m.totals.total_requests;
        if m.totals.avg_assign_time > 0.0 {
            assign.push(m.totals.avg_assign_time);
        }
        if m.totals.avg_resolution_time > 0.0 {
            resolution.push(m.totals.avg_resolution_time);
        }
        for (status, n) in &m.distributions.requests_by_status {
            *summary.requests_by_status.entry(status.clone()).or_default() += n;
        }
        for (hour, n) in &m.distributions.requests_by_hour {
            *summary.hourly_distribution.entry(*hour).or_default() += n;
        }
        for (name, n) in &m.distributions.requests_by_technician {
            *technicians.entry(name.clone()).or_default() += n;
        }
    }

    summary.avg_assign_time = mean(&assign);
    summary.avg_resolution_time = mean(&resolution);

    let mut top: Vec<TechnicianCount> = technicians
        .into_iter()
        .map(|(name, count)| TechnicianCount { name, count })
        .collect();
    // BTreeMap order is by name, so a stable sort keeps ties alphabetical.
    top.sort_by(|a, b| b.count.cmp(&a.count));
    top.truncate(TOP_TECHNICIANS);
    summary.top_technicians = top;

    summary
}

fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / (v.len() as f64)
}
