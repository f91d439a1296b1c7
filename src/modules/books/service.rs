//! CRUD operations over the `books` collection.
//!
//! The service issues exactly one store call per operation and never coordinates between
//! requests: concurrent updates of the same book resolve as last write wins.

use std::sync::Arc;

use bookclub_db::{Document, DocumentStore, StoreError};
use thiserror::Error;
use time::OffsetDateTime;

use super::models::{Book, BookPatch, FieldError, NewBook};
use crate::utils;

/// Collection holding book documents.
pub const COLLECTION: &str = "books";

const MAX_ID_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("no book with id '{0}'")]
    NotFound(String),

    #[error("book validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Any store fault, carrying the driver message verbatim.
    #[error(transparent)]
    OperationFailed(#[from] StoreError),
}

pub type BookResult<T> = Result<T, BookError>;

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct BookService {
    store: Arc<dyn DocumentStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn create(&self, input: NewBook) -> BookResult<Book> {
        input
            .validate(utils::current_year())
            .map_err(BookError::Validation)?;

        let draft = input.into_draft(OffsetDateTime::now_utc());
        let document = match serde_json::to_value(&draft).map_err(StoreError::from)? {
            serde_json::Value::Object(document) => document,
            other => {
                return Err(StoreError::Backend(format!("book encoded as non-object {other}")).into())
            }
        };

        let stored = self.store.insert(COLLECTION, document).await?;
        let book = decode(stored)?;
        tracing::info!(book_id = %book.id, title = %book.title, "book created");
        Ok(book)
    }

    pub async fn list_all(&self) -> BookResult<Vec<Book>> {
        let books = self
            .store
            .find_all(COLLECTION)
            .await?
            .into_iter()
            .map(decode)
            .collect::<BookResult<Vec<_>>>()?;
        tracing::debug!(count = books.len(), "books listed");
        Ok(books)
    }

    pub async fn get_by_id(&self, id: &str) -> BookResult<Book> {
        let id = well_formed(id)?;
        match self.store.find_by_id(COLLECTION, id).await? {
            Some(document) => decode(document),
            None => Err(BookError::NotFound(id.to_string())),
        }
    }

    /// Merge `patch` into the stored book. An empty patch returns the book unchanged.
    pub async fn update(&self, id: &str, patch: BookPatch) -> BookResult<Book> {
        let id = well_formed(id)?;
        if let Err(errors) = patch.validate(utils::current_year()) {
            // An absent book outranks a bad patch.
            if self.store.find_by_id(COLLECTION, id).await?.is_none() {
                return Err(BookError::NotFound(id.to_string()));
            }
            return Err(BookError::Validation(errors));
        }

        let changes = patch.into_changes();
        let fields: Vec<String> = changes.keys().cloned().collect();

        let book = match self.store.find_and_update(COLLECTION, id, changes).await? {
            Some(document) => decode(document)?,
            None => return Err(BookError::NotFound(id.to_string())),
        };
        tracing::info!(book_id = %book.id, ?fields, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: &str) -> BookResult<()> {
        let id = well_formed(id)?;
        match self.store.find_and_delete(COLLECTION, id).await? {
            Some(_) => {
                tracing::info!(book_id = %id, "book deleted");
                Ok(())
            }
            None => Err(BookError::NotFound(id.to_string())),
        }
    }
}

/// Ids are opaque, but anything outside `[A-Za-z0-9_-]{1,64}` can never have been assigned.
fn well_formed(id: &str) -> BookResult<&str> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(id)
    } else {
        tracing::debug!(book_id = %id, "malformed book id");
        Err(BookError::NotFound(id.to_string()))
    }
}

fn decode(document: Document) -> BookResult<Book> {
    serde_json::from_value(serde_json::Value::Object(document))
        .map_err(|err| BookError::OperationFailed(StoreError::from(err)))
}
