//! In-memory document store.
//!
//! Collections live in a map guarded by `tokio::sync::RwLock`: reads run concurrently, writes
//! are serialized. Nothing survives a restart, which makes this backend the default for local
//! development and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collections::Collections;
use crate::{Document, DocumentStore, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<Document> {
        self.collections.write().await.insert(collection, document)
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        Ok(self.collections.read().await.find_all(collection))
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.collections.read().await.find_by_id(collection, id))
    }

    async fn find_and_update(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> StoreResult<Option<Document>> {
        Ok(self
            .collections
            .write()
            .await
            .update(collection, id, changes))
    }

    async fn find_and_delete(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.collections.write().await.delete(collection, id))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
