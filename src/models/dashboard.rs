// Rollup of many window snapshots (e.g. "today") for a manager dashboard.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicianCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub windows: usize,
    pub total_requests: u64,
    pub avg_assign_time: f64,
    pub avg_resolution_time: f64,
    pub requests_by_status: BTreeMap<String, u64>,
    pub top_technicians: Vec<TechnicianCount>,
    pub hourly_distribution: BTreeMap<u32, u64>,
}
