// Snapshot persistence over a DocumentStore: record fetch per window, keyed upsert,
// last-processed marker, and read-side listing for dashboards.

pub mod key;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::document_store::{Document, DocumentStore};
use crate::error::{AggregationError, Result};
use crate::models::{MetricsSnapshot, RawRecord, SnapshotDocument, TimeWindow};

/// Field of raw records used for window membership.
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const INTERVAL_START_FIELD: &str = "interval_start";
pub const INTERVAL_END_FIELD: &str = "interval_end";
/// How many recent snapshots are searched for a regularly keyed one when the latest is custom.
const MARKER_SCAN_LIMIT: u32 = 256;

pub struct SnapshotStore<S> {
    store: S,
    records_collection: String,
    snapshots_collection: String,
}

impl<S: DocumentStore> SnapshotStore<S> {
    pub fn new(
        store: S,
        records_collection: impl Into<String>,
        snapshots_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            records_collection: records_collection.into(),
            snapshots_collection: snapshots_collection.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records created in `[window.start, window.end)`. Query failures are logged and
    /// yield an empty batch; undecodable documents are skipped.
    #[instrument(skip(self, window), fields(store = "snapshot", operation = "fetch_records", window = %window))]
    pub async fn fetch_records(&self, window: &TimeWindow) -> Vec<RawRecord> {
        let docs = match self
            .store
            .query_range(
                &self.records_collection,
                CREATED_AT_FIELD,
                window.start,
                window.end,
            )
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                let degraded = AggregationError::FetchDegraded {
                    collection: self.records_collection.clone(),
                    source: e,
                };
                warn!(error = %degraded, "record fetch failed, aggregating empty batch");
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            match decode_record(doc) {
                Ok(record) => records.push(record),
                Err((id, e)) => warn!(id = %id, error = %e, "skipping undecodable request"),
            }
        }
        records
    }

    /// Upserts the snapshot under its window key (or a sanitized `explicit_key`) and returns
    /// the key used. Same window, same key: re-running overwrites.
    #[instrument(skip(self, snapshot), fields(store = "snapshot", operation = "persist", window = %snapshot.window))]
    pub async fn persist(
        &self,
        snapshot: &MetricsSnapshot,
        explicit_key: Option<&str>,
    ) -> Result<String> {
        let candidate = match explicit_key {
            Some(k) => k.to_string(),
            None => key::window_key(&snapshot.window),
        };
        let doc_id = key::resolve_key(&candidate, snapshot.generated_at);
        if doc_id.is_empty() {
            return Err(AggregationError::InvalidKey(candidate));
        }
        if doc_id != candidate {
            debug!(candidate = %candidate, doc_id = %doc_id, "document key sanitized");
        }

        let body = serde_json::to_value(snapshot.to_document()).map_err(|e| {
            AggregationError::PersistenceFailure {
                key: doc_id.clone(),
                source: e.into(),
            }
        })?;

        if let Err(e) = self
            .store
            .upsert(&self.snapshots_collection, &doc_id, &body)
            .await
        {
            error!(doc_id = %doc_id, error = %e, "snapshot write failed");
            return Err(AggregationError::PersistenceFailure {
                key: doc_id,
                source: e,
            });
        }

        info!(doc_id = %doc_id, collection = %self.snapshots_collection, "snapshot saved");
        Ok(doc_id)
    }

    /// `interval_end` of the most recent regularly keyed snapshot, or None when nothing was
    /// persisted yet. `custom_` snapshots are skipped.
    #[instrument(skip(self), fields(store = "snapshot", operation = "last_processed_window_end"))]
    pub async fn last_processed_window_end(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(doc) = self
            .store
            .query_latest(&self.snapshots_collection, INTERVAL_END_FIELD)
            .await?
        else {
            return Ok(None);
        };
        let doc = if doc.id.starts_with(key::CUSTOM_KEY_PREFIX) {
            let recent = self
                .store
                .query_recent(
                    &self.snapshots_collection,
                    INTERVAL_END_FIELD,
                    MARKER_SCAN_LIMIT,
                )
                .await?;
            match recent
                .into_iter()
                .find(|d| !d.id.starts_with(key::CUSTOM_KEY_PREFIX))
            {
                Some(doc) => doc,
                None => {
                    debug!("only custom snapshots among the most recent, no marker");
                    return Ok(None);
                }
            }
        } else {
            doc
        };
        let end = doc
            .data
            .get(INTERVAL_END_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc));
        if end.is_none() {
            warn!(id = %doc.id, "latest snapshot has no parseable interval_end");
        }
        Ok(end)
    }

    /// Snapshots with `interval_start` in `[start, end)`, newest first.
    #[instrument(skip(self), fields(store = "snapshot", operation = "snapshots_between"))]
    pub async fn snapshots_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<(String, SnapshotDocument)>> {
        let docs = self
            .store
            .query_range(&self.snapshots_collection, INTERVAL_START_FIELD, start, end)
            .await?;
        let mut out = decode_snapshots(docs);
        out.reverse();
        Ok(out)
    }

    /// Up to `limit` snapshots, most recent `interval_end` first.
    pub async fn recent_snapshots(&self, limit: u32) -> Result<Vec<(String, SnapshotDocument)>> {
        let docs = self
            .store
            .query_recent(&self.snapshots_collection, INTERVAL_END_FIELD, limit)
            .await?;
        Ok(decode_snapshots(docs))
    }
}

fn decode_record(doc: Document) -> std::result::Result<RawRecord, (String, serde_json::Error)> {
    match serde_json::from_value::<RawRecord>(doc.data) {
        Ok(mut record) => {
            record.id = doc.id;
            Ok(record)
        }
        Err(e) => Err((doc.id, e)),
    }
}

fn decode_snapshots(docs: Vec<Document>) -> Vec<(String, SnapshotDocument)> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value::<SnapshotDocument>(doc.data) {
            Ok(snapshot) => Some((doc.id, snapshot)),
            Err(e) => {
                debug!(id = %doc.id, error = %e, "skipping undecodable snapshot");
                None
            }
        })
        .collect()
}
