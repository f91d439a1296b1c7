//! Client-side catalog state.
//!
//! The collection is fetched once; every later mutation performs the HTTP call and then patches
//! the local copy. A failed call leaves the state as it was and raises a dismissible error.

use bookclub_app::books::models::{Book, BookPatch, NewBook};

use crate::api::CatalogApi;
use crate::form::{BookFields, FormError};

pub const FETCH_FAILED: &str = "Failed to fetch books. Please try again later.";
pub const ADD_FAILED: &str = "Failed to add book. Please try again.";
pub const UPDATE_FAILED: &str = "Failed to update book. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete book. Please try again.";

#[derive(Debug, Default, Clone)]
pub struct CatalogState {
    pub books: Vec<Book>,
    pub current: Option<Book>,
    pub search_query: String,
    pub show_form: bool,
    pub editing: Option<Book>,
    pub error: Option<String>,
}

impl CatalogState {
    /// Books matching the search text on title, author or genre, ignoring case.
    pub fn filtered(&self) -> Vec<&Book> {
        let query = self.search_query.to_lowercase();
        self.books
            .iter()
            .filter(|book| {
                book.title.to_lowercase().contains(&query)
                    || book.author.to_lowercase().contains(&query)
                    || book
                        .genre
                        .as_deref()
                        .is_some_and(|genre| genre.to_lowercase().contains(&query))
            })
            .collect()
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn find(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn select(&mut self, id: &str) -> Option<&Book> {
        self.current = self.find(id).cloned();
        self.current.as_ref()
    }

    pub fn open_new_form(&mut self) {
        self.editing = None;
        self.show_form = true;
    }

    /// Open the form on an existing book. Returns false when the id is not loaded.
    pub fn open_edit_form(&mut self, id: &str) -> bool {
        match self.find(id).cloned() {
            Some(book) => {
                self.editing = Some(book);
                self.show_form = true;
                true
            }
            None => false,
        }
    }

    pub fn close_form(&mut self) {
        self.editing = None;
        self.show_form = false;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn apply_created(&mut self, book: Book) {
        self.books.push(book);
        self.close_form();
    }

    fn apply_updated(&mut self, book: Book) {
        if let Some(slot) = self.books.iter_mut().find(|b| b.id == book.id) {
            *slot = book.clone();
        }
        self.current = Some(book);
        self.close_form();
    }

    fn apply_deleted(&mut self, id: &str) {
        self.books.retain(|book| book.id != id);
        if self.current.as_ref().is_some_and(|book| book.id == id) {
            self.current = None;
        }
    }
}

/// Catalog state bound to the API it mirrors.
pub struct Catalog<A> {
    api: A,
    pub state: CatalogState,
}

impl<A: CatalogApi> Catalog<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: CatalogState::default(),
        }
    }

    /// Fetch the full collection, replacing the local copy.
    pub async fn load(&mut self) -> bool {
        self.state.error = None;
        match self.api.list().await {
            Ok(books) => {
                self.state.books = books;
                true
            }
            Err(err) => self.fail(FETCH_FAILED, err),
        }
    }

    /// Submit the open form: create when no book is being edited, update otherwise.
    ///
    /// Fields are validated first; invalid input closes nothing and calls nothing.
    pub async fn submit(&mut self, fields: BookFields) -> Result<bool, FormError> {
        match self.state.editing.as_ref().map(|book| book.id.clone()) {
            Some(id) => {
                let patch = fields.into_patch()?;
                Ok(self.update(&id, patch).await)
            }
            None => {
                let book = fields.into_new_book()?;
                Ok(self.add(book).await)
            }
        }
    }

    pub async fn add(&mut self, book: NewBook) -> bool {
        match self.api.create(&book).await {
            Ok(created) => {
                self.state.apply_created(created);
                true
            }
            Err(err) => self.fail(ADD_FAILED, err),
        }
    }

    pub async fn update(&mut self, id: &str, patch: BookPatch) -> bool {
        match self.api.update(id, &patch).await {
            Ok(updated) => {
                self.state.apply_updated(updated);
                true
            }
            Err(err) => self.fail(UPDATE_FAILED, err),
        }
    }

    /// Delete after the caller obtained confirmation. Unconfirmed deletes do nothing.
    pub async fn delete(&mut self, id: &str, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        match self.api.delete(id).await {
            Ok(_) => {
                self.state.apply_deleted(id);
                true
            }
            Err(err) => self.fail(DELETE_FAILED, err),
        }
    }

    fn fail(&mut self, banner: &str, err: impl std::fmt::Display) -> bool {
        tracing::warn!(error = %err, "{}", banner);
        self.state.error = Some(banner.to_string());
        false
    }
}
