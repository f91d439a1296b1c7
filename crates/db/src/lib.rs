//! Document store driver for the book catalog.
//!
//! Callers hold an `Arc<dyn DocumentStore>` opened once at startup with [`connect`] and pass it
//! to whatever needs persistence. Backends are picked by endpoint scheme:
//! - `memory://` keeps every collection in process memory (lost on restart).
//! - `file://<path>` keeps collections in memory and rewrites a JSON file after every mutation.
//!
//! Documents are JSON objects. The store owns the `_id` field: it is assigned on insert and can
//! never be changed afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod collections;
pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A single stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Name of the identifier field every stored document carries.
pub const ID_FIELD: &str = "_id";

const MEMORY_SCHEME: &str = "memory://";
const FILE_SCHEME: &str = "file://";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported store endpoint '{0}'")]
    Unsupported(String),
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations a document-store driver exposes to the rest of the application.
///
/// Every call targets one collection and touches at most one document, so there is no
/// coordination between calls beyond what the backend does internally. Concurrent updates to
/// the same document resolve as last write wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document and return it with its assigned `_id`.
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<Document>;

    /// Every document of the collection in insertion order. A missing collection is empty.
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Merge `changes` into the matching document and return the document as stored afterwards.
    async fn find_and_update(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> StoreResult<Option<Document>>;

    /// Remove the matching document and return it.
    async fn find_and_delete(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    async fn ping(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Open the store behind `endpoint`.
pub async fn connect(endpoint: &str) -> StoreResult<Arc<dyn DocumentStore>> {
    if endpoint == MEMORY_SCHEME {
        tracing::info!(target: "bookclub-db", backend = "memory", "document store ready");
        return Ok(Arc::new(MemoryStore::new()));
    }

    if let Some(path) = endpoint.strip_prefix(FILE_SCHEME) {
        if path.is_empty() {
            return Err(StoreError::Unsupported(endpoint.to_string()));
        }
        let store = FileStore::open(path).await?;
        tracing::info!(target: "bookclub-db", backend = "file", path, "document store ready");
        return Ok(Arc::new(store));
    }

    Err(StoreError::Unsupported(endpoint.to_string()))
}
