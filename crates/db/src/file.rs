//! JSON-file backed document store.
//!
//! The whole dataset is loaded at open time and kept in memory. Every mutation is applied to a
//! copy of the collections, written to `<path>.tmp`, renamed over `<path>`, and only then made
//! visible to readers. A failed write leaves both the file and the in-memory state untouched.
//! Once a mutation starts writing it runs to completion on its own task, so a caller that stops
//! waiting (a request timeout) cannot leave the file ahead of memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collections::Collections;
use crate::{Document, DocumentStore, StoreError, StoreResult};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    collections: Arc<RwLock<Collections>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let collections = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Collections::default(),
            Ok(bytes) => Collections::from_value(serde_json::from_slice(&bytes)?)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                Collections::default()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            collections: Arc::new(RwLock::new(collections)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `mutate` to a copy, persist it, then publish it.
    async fn mutate<T>(
        &self,
        mutate: impl FnOnce(&mut Collections) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.collections.clone().write_owned().await;
        let mut next = guard.clone();
        let output = mutate(&mut next)?;

        let path = self.path.clone();
        tokio::spawn(async move {
            persist(&path, &next).await?;
            *guard = next;
            Ok::<_, StoreError>(())
        })
        .await
        .map_err(|err| StoreError::Backend(format!("store write task failed: {err}")))??;

        Ok(output)
    }
}

async fn persist(path: &Path, collections: &Collections) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(&collections.to_value())?;
    let mut tmp = path.to_path_buf().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::debug!(target: "bookclub-db", path = %path.display(), "store file written");
    Ok(())
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<Document> {
        self.mutate(|c| c.insert(collection, document)).await
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
        if self.find_by_id(collection, id).await?.is_none() {
            return Ok(None);
        }
        self.mutate(|c| Ok(c.update(collection, id, changes))).await
    }

    async fn find_and_delete(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        if self.find_by_id(collection, id).await?.is_none() {
            return Ok(None);
        }
        self.mutate(|c| Ok(c.delete(collection, id))).await
    }

    async fn ping(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::metadata(parent).await?;
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
