use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use bookclub_db::{DocumentStore, MemoryStore};
use bookclub_kernel::{settings::Settings, ModuleRegistry};

pub fn app_with_store(store: Arc<dyn DocumentStore>) -> Router {
    let mut registry = ModuleRegistry::new();
    bookclub_app::register_all(&mut registry, &store).expect("register modules");
    bookclub_http::build_router(&registry, &Settings::default(), store)
}

pub fn app() -> Router {
    app_with_store(Arc::new(MemoryStore::new()))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn form_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
