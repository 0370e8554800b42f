// Narrow document-store contract: range query on a timestamp field, upsert by key,
// latest-by-field. SQLite implementation in `sqlite`.

mod sqlite;

pub use sqlite::SqliteDocumentStore;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One stored document: key within its collection plus a JSON object body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Operations the aggregation pipeline needs from a document store.
///
/// Timestamp fields are RFC 3339 strings inside the document body. Implementations compare
/// them as instants, not as text.
pub trait DocumentStore {
    /// Documents whose `field` lies in `[start, end)`, ascending by `field`.
    fn query_range(
        &self,
        collection: &str,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Insert or replace the document stored under `key`.
    fn upsert(
        &self,
        collection: &str,
        key: &str,
        document: &Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Document with the greatest `order_field`, if the collection has any.
    fn query_latest(
        &self,
        collection: &str,
        order_field: &str,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Up to `limit` documents ordered by `order_field` descending.
    fn query_recent(
        &self,
        collection: &str,
        order_field: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;
}
