// Dashboard rollup over persisted snapshot documents

use std::collections::BTreeMap;

use service_metrics::dashboard::summarize;
use service_metrics::models::{Distributions, Metrics, SnapshotDocument, Totals};

fn doc(total: u64, assign: f64, resolution: f64, techs: &[(&str, u64)]) -> SnapshotDocument {
    SnapshotDocument {
        interval_start: "2024-03-10T09:00:00Z".into(),
        interval_end: "2024-03-10T09:15:00Z".into(),
        generated_at: "2024-03-10T09:15:01Z".into(),
        metrics: Metrics {
            totals: Totals {
                total_requests: total,
                avg_assign_time: assign,
                avg_resolution_time: resolution,
            },
            distributions: Distributions {
                requests_by_status: BTreeMap::from([("pending".to_string(), total)]),
                requests_by_technician: techs
                    .iter()
                    .map(|(name, n)| (name.to_string(), *n))
                    .collect(),
                requests_by_hour: BTreeMap::from([(9, total)]),
            },
            per_technician: BTreeMap::new(),
        },
    }
}

#[test]
fn summarize_empty_is_zeroed() {
    let s = summarize(&Vec::<SnapshotDocument>::new());
    assert_eq!(s.windows, 0);
    assert_eq!(s.total_requests, 0);
    assert_eq!(s.avg_assign_time, 0.0);
    assert!(s.top_technicians.is_empty());
}

#[test]
fn summarize_sums_counts_and_ignores_zero_averages() {
    let docs = vec![
        doc(3, 30.0, 0.0, &[]),
        doc(0, 0.0, 0.0, &[]),
        doc(1, 90.0, 600.0, &[]),
    ];
    let s = summarize(&docs);
    assert_eq!(s.windows, 3);
    assert_eq!(s.total_requests, 4);
    assert_eq!(s.avg_assign_time, 60.0);
    assert_eq!(s.avg_resolution_time, 600.0);
    assert_eq!(s.requests_by_status["pending"], 4);
    assert_eq!(s.hourly_distribution[&9], 4);
}

#[test]
fn top_technicians_sorted_by_count_then_name_and_capped() {
    let docs = vec![
        doc(0, 0.0, 0.0, &[("Fay", 1), ("Ben", 4), ("Asha", 2)]),
        doc(0, 0.0, 0.0, &[("Cyd", 2), ("Dev", 1), ("Eli", 3), ("Asha", 1)]),
    ];
    let s = summarize(&docs);
    let names: Vec<&str> = s.top_technicians.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Ben", "Asha", "Eli", "Cyd", "Dev"]);
    assert_eq!(s.top_technicians[1].count, 3);
}
