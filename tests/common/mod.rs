// Shared test helpers: in-memory DocumentStore, a fault-injecting wrapper, record builders.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::{Value, json};
use service_metrics::document_store::{Document, DocumentStore, StoreError};

#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, key: &str, data: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), data);
    }

    pub fn get(&self, collection: &str, key: &str) -> Option<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|c| c.get(key).cloned())
    }

    pub fn keys(&self, collection: &str) -> Vec<String> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Documents with a parseable timestamp at `field`, sorted ascending by it.
    fn sorted_by(&self, collection: &str, field: &str) -> Vec<(DateTime<Utc>, Document)> {
        let guard = self.collections.lock().unwrap();
        let mut out: Vec<(DateTime<Utc>, Document)> = guard
            .get(collection)
            .into_iter()
            .flat_map(|c| c.iter())
            .filter_map(|(id, data)| {
                let ts = data.get(field)?.as_str()?;
                let ts = DateTime::parse_from_rfc3339(ts).ok()?.with_timezone(&Utc);
                Some((
                    ts,
                    Document {
                        id: id.clone(),
                        data: data.clone(),
                    },
                ))
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        out
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn query_range(
        &self,
        collection: &str,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .sorted_by(collection, field)
            .into_iter()
            .filter(|(ts, _)| *ts >= start && *ts < end)
            .map(|(_, doc)| doc)
            .collect())
    }

    async fn upsert(&self, collection: &str, key: &str, document: &Value) -> Result<(), StoreError> {
        self.insert(collection, key, document.clone());
        Ok(())
    }

    async fn query_latest(
        &self,
        collection: &str,
        order_field: &str,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .sorted_by(collection, order_field)
            .pop()
            .map(|(_, doc)| doc))
    }

    async fn query_recent(
        &self,
        collection: &str,
        order_field: &str,
        limit: u32,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .sorted_by(collection, order_field)
            .into_iter()
            .rev()
            .take(limit as usize)
            .map(|(_, doc)| doc)
            .collect())
    }
}

/// Wraps the memory store and fails selected operations.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryDocumentStore,
    pub fail_range_queries: bool,
    pub fail_latest: bool,
    pub fail_upsert_keys: HashSet<String>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unavailable(op: &str) -> StoreError {
    StoreError::Unavailable(format!("{} injected failure", op))
}

impl DocumentStore for FlakyStore {
    async fn query_range(
        &self,
        collection: &str,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>, StoreError> {
        if self.fail_range_queries {
            return Err(unavailable("query_range"));
        }
        self.inner.query_range(collection, field, start, end).await
    }

    async fn upsert(&self, collection: &str, key: &str, document: &Value) -> Result<(), StoreError> {
        if self.fail_upsert_keys.contains(key) {
            return Err(unavailable("upsert"));
        }
        self.inner.upsert(collection, key, document).await
    }

    async fn query_latest(
        &self,
        collection: &str,
        order_field: &str,
    ) -> Result<Option<Document>, StoreError> {
        if self.fail_latest {
            return Err(unavailable("query_latest"));
        }
        self.inner.query_latest(collection, order_field).await
    }

    async fn query_recent(
        &self,
        collection: &str,
        order_field: &str,
        limit: u32,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.query_recent(collection, order_field, limit).await
    }
}

pub const RECORDS: &str = "requests";
pub const SNAPSHOTS: &str = "service_metrics";

pub fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).unwrap()
}

pub fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Request body with optional accept/close offsets (seconds after creation).
pub fn request(
    created: DateTime<Utc>,
    accepted_after: Option<i64>,
    closed_after: Option<i64>,
    status: &str,
    technician: Option<(&str, &str)>,
) -> Value {
    let mut doc = json!({
        "createdAt": iso(created),
        "status": status,
        "authorName": "Customer",
    });
    if let Some(secs) = accepted_after {
        doc["acceptedAt"] = json!(iso(created + TimeDelta::seconds(secs)));
    }
    if let Some(secs) = closed_after {
        doc["closedAt"] = json!(iso(created + TimeDelta::seconds(secs)));
    }
    if let Some((id, name)) = technician {
        doc["technicianId"] = json!(id);
        doc["technicianName"] = json!(name);
    }
    doc
}
