// SQLite-backed document store: one `documents` table, JSON bodies, (collection, id) primary key.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::instrument;

use super::{Document, DocumentStore, StoreError};

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    fn parse_row(row: &SqliteRow) -> Result<Document, StoreError> {
        let id: String = row.try_get("id")?;
        let data: String = row.try_get("data")?;
        Ok(Document {
            id,
            data: serde_json::from_str(&data)?,
        })
    }
}

fn json_path(field: &str) -> String {
    format!("$.{}", field)
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl DocumentStore for SqliteDocumentStore {
    #[instrument(skip(self), fields(store = "sqlite", operation = "query_range"))]
    async fn query_range(
        &self,
        collection: &str,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, data FROM documents
             WHERE collection = $1
               AND julianday(json_extract(data, $2)) >= julianday($3)
               AND julianday(json_extract(data, $2)) < julianday($4)
             ORDER BY julianday(json_extract(data, $2)) ASC, id ASC",
        )
        .bind(collection)
        .bind(json_path(field))
        .bind(iso(start))
        .bind(iso(end))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_row).collect()
    }

    #[instrument(skip(self, document), fields(store = "sqlite", operation = "upsert"))]
    async fn upsert(&self, collection: &str, key: &str, document: &Value) -> Result<(), StoreError> {
        let data = serde_json::to_string(document)?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(&data)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(store = "sqlite", operation = "query_latest"))]
    async fn query_latest(
        &self,
        collection: &str,
        order_field: &str,
    ) -> Result<Option<Document>, StoreError> {
        let mut docs = self.query_recent(collection, order_field, 1).await?;
        Ok(docs.pop())
    }

    #[instrument(skip(self), fields(store = "sqlite", operation = "query_recent"))]
    async fn query_recent(
        &self,
        collection: &str,
        order_field: &str,
        limit: u32,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, data FROM documents
             WHERE collection = $1 AND json_extract(data, $2) IS NOT NULL
             ORDER BY julianday(json_extract(data, $2)) DESC, id DESC
             LIMIT $3",
        )
        .bind(collection)
        .bind(json_path(order_field))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_row).collect()
    }
}
