//! Postgres-backed document store.
//!
//! Each collection is a table of `(id UUID, doc JSONB)` rows. Field-level
//! merge is JSONB concatenation, which replaces top-level keys only.

use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, InsertOneResult, StoreError, StoredDocument,
    UpdateResult,
};

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<StoredDocument, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let Json(fields) = row.try_get::<Json<Document>, _>("doc")?;
    Ok(StoredDocument { id: id.into(), fields })
}

#[async_trait::async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOneResult, StoreError> {
        let sql = format!("INSERT INTO {} (doc) VALUES ($1) RETURNING id", collection.table());
        let id: Uuid = sqlx::query_scalar(&sql)
            .bind(Json(doc))
            .fetch_one(&self.pool)
            .await?;
        Ok(InsertOneResult::new(id.into()))
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>, StoreError> {
        let sql = format!("SELECT id, doc FROM {} ORDER BY seq", collection.table());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let docs = rows
            .iter()
            .map(row_to_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    async fn find_one(&self, collection: Collection, id: DocumentId) -> Result<Option<StoredDocument>, StoreError> {
        let sql = format!("SELECT id, doc FROM {} WHERE id = $1", collection.table());
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_document).transpose()?)
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        patch: Document,
    ) -> Result<UpdateResult, StoreError> {
        // `target` locks the row so matched/modified are counted against the
        // same snapshot the UPDATE sees.
        let table = collection.table();
        let sql = format!(
            r"WITH target AS (
                  SELECT id, doc FROM {table} WHERE id = $1 FOR UPDATE
              ),
              changed AS (
                  UPDATE {table} AS d SET doc = target.doc || $2
                  FROM target
                  WHERE d.id = target.id AND (target.doc || $2) IS DISTINCT FROM target.doc
                  RETURNING d.id
              )
              SELECT (SELECT COUNT(*) FROM target) AS matched,
                     (SELECT COUNT(*) FROM changed) AS modified"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Json(patch))
            .fetch_one(&self.pool)
            .await?;
        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;
        Ok(UpdateResult::new(matched.unsigned_abs(), modified.unsigned_abs()))
    }

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", collection.table());
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(DeleteResult::new(result.rows_affected()))
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
