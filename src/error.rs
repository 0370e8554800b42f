// Error taxonomy for the aggregation pipeline.

use thiserror::Error;

use crate::document_store::StoreError;

pub type Result<T> = std::result::Result<T, AggregationError>;

#[derive(Error, Debug)]
pub enum AggregationError {
    /// Explicit interval start did not match `YYYY-MM-DDTHH:MM:SSZ`.
    #[error("malformed timestamp {input:?}: expected YYYY-MM-DDTHH:MM:SSZ")]
    MalformedTimestamp { input: String },

    /// Record query failed. Recovered as an empty batch by the snapshot store.
    #[error("fetch degraded for {collection}: {source}")]
    FetchDegraded {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// Snapshot write failed after the key was computed.
    #[error("failed to persist snapshot {key}: {source}")]
    PersistenceFailure {
        key: String,
        #[source]
        source: StoreError,
    },

    /// No usable document key could be produced.
    #[error("invalid document key {0:?}")]
    InvalidKey(String),

    /// Read-side store query failed (last-processed marker, dashboard reads).
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AggregationError {
    pub fn malformed_timestamp(input: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            input: input.into(),
        }
    }
}
