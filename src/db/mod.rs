//! Document store: collection accessors and the Postgres pool.
//!
//! DESIGN
//! ======
//! Every collection is a bag of schemaless JSON documents keyed by a
//! storage-generated UUID. Route handlers talk to the store through the
//! [`DocumentStore`] trait so the Postgres adapter can be swapped for the
//! in-memory one in tests.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub use postgres::PgDocumentStore;

/// Schemaless document body. Top-level keys are field names.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Key under which the identifier is exposed to clients.
pub const ID_FIELD: &str = "_id";

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque document identifier generated by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid document identifier: {0:?}")]
pub struct InvalidDocumentId(pub String);

impl FromStr for DocumentId {
    type Err = InvalidDocumentId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(raw)
            .map(Self)
            .map_err(|_| InvalidDocumentId(raw.to_owned()))
    }
}

// =============================================================================
// COLLECTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Bookings,
    Messages,
}

impl Collection {
    /// Backing table name. Static so it can be spliced into SQL text.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Bookings => "bookings",
            Self::Messages => "messages",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// A document as read back from the store, with its identifier attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub fields: Document,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

impl InsertOneResult {
    #[must_use]
    pub fn new(inserted_id: DocumentId) -> Self {
        Self { acknowledged: true, inserted_id }
    }
}

/// Outcome of a single-document merge. `modified_count` only counts
/// documents whose content actually changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<DocumentId>,
    pub upserted_count: u64,
}

impl UpdateResult {
    #[must_use]
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self { acknowledged: true, matched_count, modified_count, upserted_id: None, upserted_count: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    #[must_use]
    pub fn new(deleted_count: u64) -> Self {
        Self { acknowledged: true, deleted_count }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Generic document store. A missing document is never an error: reads
/// return `None` and mutations report zero counts.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOneResult, StoreError>;

    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>, StoreError>;

    async fn find_one(&self, collection: Collection, id: DocumentId) -> Result<Option<StoredDocument>, StoreError>;

    /// Set every top-level field of `patch` on the document, leaving other
    /// fields untouched.
    async fn update_one(&self, collection: Collection, id: DocumentId, patch: Document)
    -> Result<UpdateResult, StoreError>;

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult, StoreError>;
}

// =============================================================================
// POOL
// =============================================================================

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
