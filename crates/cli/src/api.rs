//! HTTP access to the catalog API.

use async_trait::async_trait;
use bookclub_app::books::models::{Book, BookPatch, DeleteConfirmation, NewBook};
use bookclub_http::error::ErrorBody;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status}: {message} ({error})")]
    Status {
        status: StatusCode,
        message: String,
        error: String,
    },
}

/// Calls the client makes against the catalog. The collection is fetched once and then patched
/// locally, so single-book reads never go over the wire.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, ApiError>;
    async fn create(&self, book: &NewBook) -> Result<Book, ApiError>;
    async fn update(&self, id: &str, patch: &BookPatch) -> Result<Book, ApiError>;
    async fn delete(&self, id: &str) -> Result<DeleteConfirmation, ApiError>;
}

pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bookclub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn books_url(&self) -> String {
        format!("{}/books", self.base_url)
    }

    fn book_url(&self, id: &str) -> String {
        format!("{}/books/{}", self.base_url, id)
    }
}

/// Pass successful responses through; turn failures into [`ApiError::Status`].
async fn checked(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await?;
    let (message, error) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.message, body.error),
        // Bodies that carry only a message.
        Err(_) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(body)) => (
                body.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                String::new(),
            ),
            _ => (text, String::new()),
        },
    };

    tracing::debug!(%status, %message, %error, "catalog request failed");
    Err(ApiError::Status {
        status,
        message,
        error,
    })
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn list(&self) -> Result<Vec<Book>, ApiError> {
        let response = self.client.get(self.books_url()).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    async fn create(&self, book: &NewBook) -> Result<Book, ApiError> {
        let response = self
            .client
            .post(self.books_url())
            .json(book)
            .send()
            .await?;
        Ok(checked(response).await?.json().await?)
    }

    async fn update(&self, id: &str, patch: &BookPatch) -> Result<Book, ApiError> {
        let response = self
            .client
            .put(self.book_url(id))
            .json(patch)
            .send()
            .await?;
        Ok(checked(response).await?.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<DeleteConfirmation, ApiError> {
        let response = self.client.delete(self.book_url(id)).send().await?;
        Ok(checked(response).await?.json().await?)
    }
}
