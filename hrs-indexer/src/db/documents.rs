//! Hotel document persistence (SQLite backend)
//!
//! One row per hotel document: the store key, the hotel name (indexed for
//! lookup) and the JSON body in the persisted document schema. Writes
//! replace the whole row.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::models::{DocumentId, HotelDocument};
use crate::types::{DocumentStore, StoreError};

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a document by its store key
    pub async fn fetch_by_id(&self, id: &DocumentId) -> Result<Option<HotelDocument>, StoreError> {
        let row = sqlx::query("SELECT id, body FROM hotel_documents WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        row.map(|row| decode_row(&row)).transpose()
    }

    /// Number of stored documents
    pub async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM hotel_documents")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn decode_row(row: &sqlx::sqlite::SqliteRow) -> Result<HotelDocument, StoreError> {
    let id: String = row.get("id");
    let body: String = row.get("body");

    let value: serde_json::Value =
        serde_json::from_str(&body).map_err(|e| StoreError::Malformed(format!("{}: {}", id, e)))?;
    HotelDocument::from_stored(DocumentId::new(id.clone()), value)
        .map_err(|e| StoreError::Malformed(format!("{}: {}", id, e)))
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_by_name(&self, hotel_name: &str) -> Result<Option<HotelDocument>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, body
            FROM hotel_documents
            WHERE name = ?
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(hotel_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        row.map(|row| decode_row(&row)).transpose()
    }

    async fn upsert(&self, id: &DocumentId, document: &HotelDocument) -> Result<(), StoreError> {
        let body = serde_json::to_string(document).map_err(|e| StoreError::Write(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO hotel_documents (id, name, body, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(&document.name)
        .bind(body)
        .bind(hrs_common::time::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(e.to_string()))?;

        tracing::debug!(doc_id = %id, hotel = %document.name, "Stored hotel document");

        Ok(())
    }
}
