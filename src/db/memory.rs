//! In-memory document store with the same semantics as the Postgres adapter.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, InsertOneResult, StoreError, StoredDocument,
    UpdateResult,
};

/// Documents per collection, kept in insertion order.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<StoredDocument>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

/// Apply a top-level merge in place. Returns `true` when any field changed.
fn merge_fields(doc: &mut Document, patch: Document) -> bool {
    let mut changed = false;
    for (key, value) in patch {
        if doc.get(&key) != Some(&value) {
            doc.insert(key, value);
            changed = true;
        }
    }
    changed
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOneResult, StoreError> {
        let id = DocumentId::new();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .push(StoredDocument { id, fields: doc });
        Ok(InsertOneResult::new(id))
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, id: DocumentId) -> Result<Option<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        patch: Document,
    ) -> Result<UpdateResult, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(UpdateResult::new(0, 0));
        };
        let modified = u64::from(merge_fields(&mut doc.fields, patch));
        Ok(UpdateResult::new(1, modified))
    }

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(DeleteResult::new(0));
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(DeleteResult::new((before - docs.len()) as u64))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn insert_then_find_one_returns_fields() {
        let store = MemoryDocumentStore::new();
        let inserted = store
            .insert_one(Collection::Services, doc(json!({"title": "Plumbing"})))
            .await
            .unwrap();

        let found = store
            .find_one(Collection::Services, inserted.inserted_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, inserted.inserted_id);
        assert_eq!(found.fields.get("title"), Some(&json!("Plumbing")));
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let store = MemoryDocumentStore::new();
        let inserted = store
            .insert_one(Collection::Messages, doc(json!({"text": "hi"})))
            .await
            .unwrap();

        assert!(
            store
                .find_one(Collection::Bookings, inserted.inserted_id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.count(Collection::Messages).await, 1);
        assert_eq!(store.count(Collection::Bookings).await, 0);
    }

    #[tokio::test]
    async fn find_all_keeps_insertion_order() {
        let store = MemoryDocumentStore::new();
        for n in 0..3 {
            store
                .insert_one(Collection::Messages, doc(json!({"n": n})))
                .await
                .unwrap();
        }
        let all = store.find_all(Collection::Messages).await.unwrap();
        let ns: Vec<_> = all.iter().map(|d| d.fields["n"].clone()).collect();
        assert_eq!(ns, vec![json!(0), json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn update_counts_matched_and_modified_separately() {
        let store = MemoryDocumentStore::new();
        let id = store
            .insert_one(Collection::Services, doc(json!({"title": "a", "price": 1})))
            .await
            .unwrap()
            .inserted_id;

        let changed = store
            .update_one(Collection::Services, id, doc(json!({"price": 2})))
            .await
            .unwrap();
        assert_eq!((changed.matched_count, changed.modified_count), (1, 1));

        let unchanged = store
            .update_one(Collection::Services, id, doc(json!({"price": 2})))
            .await
            .unwrap();
        assert_eq!((unchanged.matched_count, unchanged.modified_count), (1, 0));

        let found = store
            .find_one(Collection::Services, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.fields, doc(json!({"title": "a", "price": 2})));
    }

    #[tokio::test]
    async fn missing_ids_report_zero_counts() {
        let store = MemoryDocumentStore::new();
        let id = DocumentId::new();

        let updated = store
            .update_one(Collection::Bookings, id, doc(json!({"serviceStatus": "done"})))
            .await
            .unwrap();
        assert_eq!(updated, UpdateResult::new(0, 0));

        let deleted = store.delete_one(Collection::Services, id).await.unwrap();
        assert_eq!(deleted, DeleteResult::new(0));
    }

    #[tokio::test]
    async fn delete_removes_only_target() {
        let store = MemoryDocumentStore::new();
        let keep = store
            .insert_one(Collection::Services, doc(json!({"title": "keep"})))
            .await
            .unwrap()
            .inserted_id;
        let drop = store
            .insert_one(Collection::Services, doc(json!({"title": "drop"})))
            .await
            .unwrap()
            .inserted_id;

        let deleted = store.delete_one(Collection::Services, drop).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);
        assert!(
            store
                .find_one(Collection::Services, keep)
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(store.count(Collection::Services).await, 1);
    }

    #[test]
    fn merge_sets_new_and_replaces_existing_fields() {
        let mut target = doc(json!({"title": "a", "price": 1}));
        assert!(merge_fields(&mut target, doc(json!({"price": 2, "city": "Oslo"}))));
        assert_eq!(target, doc(json!({"title": "a", "price": 2, "city": "Oslo"})));
    }

    #[test]
    fn merge_replaces_nested_objects_wholesale() {
        let mut target = doc(json!({"meta": {"a": 1, "b": 2}}));
        merge_fields(&mut target, doc(json!({"meta": {"a": 3}})));
        assert_eq!(target, doc(json!({"meta": {"a": 3}})));
    }

    #[test]
    fn merge_with_identical_values_or_empty_patch_reports_no_change() {
        let mut target = doc(json!({"title": "a"}));
        assert!(!merge_fields(&mut target, doc(json!({"title": "a"}))));
        assert!(!merge_fields(&mut target, Document::new()));
        assert_eq!(target, doc(json!({"title": "a"})));
    }
}
