// Model decoding and document conversion

use chrono::{TimeDelta, TimeZone, Utc};
use serde_json::json;
use service_metrics::models::{
    Metrics, MetricsSnapshot, RawRecord, RequestStatus, RunResult, SnapshotDocument, TimeWindow,
};

#[test]
fn raw_record_decodes_full_document() {
    let r: RawRecord = serde_json::from_value(json!({
        "createdAt": "2024-03-10T09:00:00Z",
        "acceptedAt": "2024-03-10T09:01:00Z",
        "closedAt": "2024-03-10T09:10:00.500Z",
        "status": "closed",
        "technicianId": "t1",
        "technicianName": "Asha",
        "authorName": "Customer"
    }))
    .unwrap();
    assert_eq!(r.status, RequestStatus::Closed);
    assert_eq!(r.assign_time_secs(), Some(60.0));
    assert_eq!(r.resolution_time_secs(), Some(600.5));
    assert_eq!(r.assigned_technician(), Some("t1"));
    assert_eq!(r.author_name, "Customer");
}

#[test]
fn raw_record_defaults_missing_and_null_fields() {
    let r: RawRecord = serde_json::from_value(json!({
        "createdAt": "2024-03-10T09:00:00Z",
        "acceptedAt": null,
        "status": null,
        "technicianName": null
    }))
    .unwrap();
    assert_eq!(r.status, RequestStatus::Unknown);
    assert_eq!(r.technician_name, "Unknown");
    assert_eq!(r.author_name, "Unknown");
    assert!(r.assign_time_secs().is_none());
    assert!(r.resolution_time_secs().is_none());
    assert!(r.assigned_technician().is_none());
}

#[test]
fn raw_record_defaults_only_the_mistyped_field() {
    let r: RawRecord = serde_json::from_value(json!({
        "createdAt": "2024-03-10T09:00:00Z",
        "acceptedAt": "not a timestamp",
        "closedAt": "2024-03-10T09:05:00Z",
        "status": 3,
        "technicianId": 12.5,
        "technicianName": false,
        "authorName": "Customer"
    }))
    .unwrap();
    assert!(r.accepted_at.is_none());
    assert_eq!(r.resolution_time_secs(), Some(300.0));
    assert_eq!(r.status, RequestStatus::Unknown);
    assert!(r.technician_id.is_none());
    assert_eq!(r.technician_name, "Unknown");
    assert_eq!(r.author_name, "Customer");
}

#[test]
fn raw_record_stringifies_numeric_technician_id() {
    let r: RawRecord = serde_json::from_value(json!({
        "createdAt": "2024-03-10T09:00:00Z",
        "technicianId": 42
    }))
    .unwrap();
    assert_eq!(r.assigned_technician(), Some("42"));
}

#[test]
fn raw_record_requires_created_at() {
    let err = serde_json::from_value::<RawRecord>(json!({ "status": "pending" }));
    assert!(err.is_err());
}

#[test]
fn snapshot_document_round_trips_through_json() {
    let start = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    let window = TimeWindow::new(start, TimeDelta::minutes(15));
    let snapshot = MetricsSnapshot::new(window, start, Metrics::default());
    let doc = snapshot.to_document();
    assert_eq!(doc.interval_end_utc(), Some(window.end));

    let value = serde_json::to_value(&doc).unwrap();
    let back: SnapshotDocument = serde_json::from_value(value).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn run_result_serializes_only_relevant_fields() {
    let start = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    let window = TimeWindow::new(start, TimeDelta::minutes(15));

    let ok = serde_json::to_value(RunResult::succeeded(window, "k".into(), &Metrics::default()))
        .unwrap();
    assert_eq!(ok["success"], true);
    assert_eq!(ok["document_id"], "k");
    assert!(ok.get("error").is_none());

    let failed = serde_json::to_value(RunResult::failed(window, "boom")).unwrap();
    assert_eq!(failed["success"], false);
    assert_eq!(failed["error"], "boom");
    assert!(failed.get("document_id").is_none());
    assert!(failed.get("metrics_summary").is_none());
}

#[test]
fn time_window_display_is_half_open() {
    let start = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    let window = TimeWindow::new(start, TimeDelta::minutes(15));
    assert_eq!(
        window.to_string(),
        "[2024-03-10T09:00:00Z, 2024-03-10T09:15:00Z)"
    );
}
