use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookclub_http::error::AppError;
use bookclub_http::extract::{Payload, PayloadRejection};

use super::models::{Book, BookPatch, DeleteConfirmation, NewBook};
use super::service::{BookError, BookService};
use crate::utils;

const CREATE_FAILED: &str = "Error creating book";
const LIST_FAILED: &str = "Error fetching books";
const FETCH_FAILED: &str = "Error fetching book";
const UPDATE_FAILED: &str = "Error updating book";
const DELETE_FAILED: &str = "Error deleting book";
const NOT_FOUND: &str = "Book not found";
const DELETED: &str = "Book deleted successfully";

/// Route table for the Books module, relative to its mount point.
///
/// Write bodies may be JSON or urlencoded forms.
///
/// | verb   | path   | operation |
/// |--------|--------|-----------|
/// | GET    | `/`    | list      |
/// | POST   | `/`    | create    |
/// | GET    | `/{id}`| get       |
/// | PUT    | `/{id}`| update    |
/// | DELETE | `/{id}`| delete    |
pub fn router(service: Arc<BookService>) -> Router {
    let prefix = utils::log_prefix("books");
    tracing::debug!(target: "project.routes", %prefix, "books routes registered");

    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

async fn list_books(
    State(service): State<Arc<BookService>>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = service
        .list_all()
        .await
        .map_err(|err| into_app_error(LIST_FAILED, err))?;
    Ok(Json(books))
}

async fn create_book(
    State(service): State<Arc<BookService>>,
    payload: Result<Payload<NewBook>, PayloadRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Payload(input) = payload.map_err(|rejection| rejected(CREATE_FAILED, rejection))?;
    let book = service
        .create(input)
        .await
        .map_err(|err| into_app_error(CREATE_FAILED, err))?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(service): State<Arc<BookService>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let book = service
        .get_by_id(&id)
        .await
        .map_err(|err| into_app_error(FETCH_FAILED, err))?;
    Ok(Json(book))
}

async fn update_book(
    State(service): State<Arc<BookService>>,
    Path(id): Path<String>,
    payload: Result<Payload<BookPatch>, PayloadRejection>,
) -> Result<Json<Book>, AppError> {
    let Payload(patch) = payload.map_err(|rejection| rejected(UPDATE_FAILED, rejection))?;
    let book = service
        .update(&id, patch)
        .await
        .map_err(|err| into_app_error(UPDATE_FAILED, err))?;
    Ok(Json(book))
}

async fn delete_book(
    State(service): State<Arc<BookService>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, AppError> {
    service
        .delete(&id)
        .await
        .map_err(|err| into_app_error(DELETE_FAILED, err))?;
    Ok(Json(DeleteConfirmation {
        message: DELETED.to_string(),
    }))
}

fn into_app_error(message: &str, err: BookError) -> AppError {
    match err {
        BookError::NotFound(_) => AppError::not_found(NOT_FOUND, err.to_string()),
        BookError::Validation(ref fields) => {
            let details = fields
                .iter()
                .filter_map(|field| serde_json::to_value(field).ok())
                .collect();
            AppError::validation(message, err.to_string(), details)
        }
        BookError::OperationFailed(store_err) => AppError::operation_failed(message, store_err),
    }
}

/// Unparseable bodies fail like any other fault of the operation.
fn rejected(message: &str, rejection: PayloadRejection) -> AppError {
    AppError::operation_failed(message, rejection.body_text())
}
