// Outcome of processing one window; returned to the caller, never persisted.

use serde::Serialize;

use super::{Metrics, TimeWindow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub avg_assign_time: f64,
    pub avg_resolution_time: f64,
}

impl From<&Metrics> for MetricsSummary {
    fn from(m: &Metrics) -> Self {
        Self {
            total_requests: m.totals.total_requests,
            avg_assign_time: m.totals.avg_assign_time,
            avg_resolution_time: m.totals.avg_resolution_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub window: TimeWindow,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_summary: Option<MetricsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    pub fn succeeded(window: TimeWindow, document_id: String, metrics: &Metrics) -> Self {
        Self {
            window,
            success: true,
            document_id: Some(document_id),
            metrics_summary: Some(MetricsSummary::from(metrics)),
            error: None,
        }
    }

    pub fn failed(window: TimeWindow, error: impl std::fmt::Display) -> Self {
        Self {
            window,
            success: false,
            document_id: None,
            metrics_summary: None,
            error: Some(error.to_string()),
        }
    }
}
