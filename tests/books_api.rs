mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use bookclub_db::{Document, DocumentStore, StoreError, StoreResult};
use common::{app, app_with_store, empty_request, form_request, json_request, read_json};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn dune_lifecycle() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/books",
            json!({"title": "Dune", "author": "Herbert"}),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    let id = created["_id"].as_str().expect("id").to_string();
    assert!(!id.is_empty());
    assert_eq!(created["isAvailable"], true);
    assert_eq!(created["ratings"], json!([]));
    assert!(created["createdAt"].is_string());

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/books/{id}")))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, created);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/books/{id}"),
            json!({"isAvailable": false}),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["isAvailable"], false);
    assert_eq!(updated["title"], "Dune");
    assert_eq!(updated["author"], "Herbert");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/books/{id}")))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({"message": "Book deleted successfully"})
    );

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/books/{id}")))
        .await
        .expect("get after delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Book not found");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn empty_store_lists_empty_array() {
    let response = app()
        .oneshot(empty_request("GET", "/books"))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!([]));
}

#[tokio::test]
async fn list_returns_every_created_book() {
    let app = app();
    for n in 0..3 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/books",
                json!({"title": format!("Volume {n}"), "author": "Anon", "genre": "Poetry"}),
            ))
            .await
            .expect("create");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(empty_request("GET", "/books"))
        .await
        .expect("list");
    let books = read_json(response).await;
    let titles: Vec<_> = books
        .as_array()
        .expect("array")
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Volume 0", "Volume 1", "Volume 2"]);
}

#[tokio::test]
async fn create_without_author_fails_validation() {
    let response = app()
        .oneshot(json_request("POST", "/books", json!({"title": "Dune"})))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Error creating book");
    assert!(body["error"].as_str().unwrap().contains("author is required"));
    assert_eq!(body["details"][0]["field"], "author");
}

#[tokio::test]
async fn malformed_json_uses_error_body() {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/books")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"title\": "))
        .expect("request");

    let response = app().oneshot(request).await.expect("create");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Error creating book");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_ids_never_crash() {
    let app = app();
    for (method, body) in [
        ("GET", None),
        ("PUT", Some(json!({"title": "x"}))),
        ("DELETE", None),
    ] {
        for id in ["not-a-real-id", "bad%20id", "0190f5c2-7a3e-7c1a-9a55-0c2b7f3f9b11"] {
            let uri = format!("/books/{id}");
            let request = match &body {
                Some(body) => json_request(method, &uri, body.clone()),
                None => empty_request(method, &uri),
            };
            let response = app.clone().oneshot(request).await.expect("response");
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(read_json(response).await["message"], "Book not found");
        }
    }
}

#[tokio::test]
async fn patch_cannot_rewrite_identity() {
    let app = app();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/books",
            json!({"title": "Emma", "author": "Austen"}),
        ))
        .await
        .expect("create");
    let created = read_json(response).await;
    let id = created["_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/books/{id}"),
            json!({"_id": "other", "createdAt": "2000-01-01T00:00:00Z", "ratings": [5, 4]}),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["_id"], created["_id"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(updated["ratings"], json!([5.0, 4.0]));
}

#[tokio::test]
async fn invalid_patch_on_missing_book_is_not_found() {
    let response = app()
        .oneshot(json_request(
            "PUT",
            "/books/0190f5c2-7a3e-7c1a-9a55-0c2b7f3f9b11",
            json!({"title": ""}),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["message"], "Book not found");
}

#[tokio::test]
async fn form_encoded_bodies_are_accepted() {
    let app = app();
    let response = app
        .clone()
        .oneshot(form_request(
            "POST",
            "/books",
            "title=Dune&author=Frank+Herbert&publishedYear=1965",
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["author"], "Frank Herbert");
    assert_eq!(created["publishedYear"], 1965);
    assert_eq!(created["isAvailable"], true);

    let id = created["_id"].as_str().expect("id");
    let response = app
        .oneshot(form_request(
            "PUT",
            &format!("/books/{id}"),
            "isAvailable=false",
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["isAvailable"], false);
}

struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn insert(&self, _: &str, _: Document) -> StoreResult<Document> {
        Err(StoreError::Backend("server selection timed out".to_string()))
    }
    async fn find_all(&self, _: &str) -> StoreResult<Vec<Document>> {
        Err(StoreError::Backend("server selection timed out".to_string()))
    }
    async fn find_by_id(&self, _: &str, _: &str) -> StoreResult<Option<Document>> {
        Err(StoreError::Backend("server selection timed out".to_string()))
    }
    async fn find_and_update(&self, _: &str, _: &str, _: Document) -> StoreResult<Option<Document>> {
        Err(StoreError::Backend("server selection timed out".to_string()))
    }
    async fn find_and_delete(&self, _: &str, _: &str) -> StoreResult<Option<Document>> {
        Err(StoreError::Backend("server selection timed out".to_string()))
    }
    async fn ping(&self) -> StoreResult<()> {
        Err(StoreError::Backend("server selection timed out".to_string()))
    }
    fn backend_name(&self) -> &'static str {
        "unreachable"
    }
}

#[tokio::test]
async fn store_faults_surface_as_500_with_driver_message() {
    let app = app_with_store(Arc::new(UnreachableStore));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/books"))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        json!({"message": "Error fetching books", "error": "server selection timed out"})
    );

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/books/abc"))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["message"], "Error deleting book");

    let response = app
        .oneshot(empty_request("GET", "/healthz"))
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn greeting_and_openapi_are_served() {
    let app = app();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/"))
        .await
        .expect("greeting");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&bytes[..], b"welcome to the server!");

    let response = app
        .oneshot(empty_request("GET", "/docs/openapi.json"))
        .await
        .expect("openapi");
    let spec = read_json(response).await;
    assert!(spec["paths"]["/books"]["post"].is_object());
    assert!(spec["paths"]["/books/{id}"]["delete"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/books")
        .header("origin", "http://localhost:5173")
        .body(axum::body::Body::empty())
        .expect("request");

    let response = app().oneshot(request).await.expect("list");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.headers().contains_key("x-request-id"));
}

#[test]
fn merged_openapi_parses_as_a_document() {
    let store: Arc<dyn DocumentStore> = Arc::new(bookclub_db::MemoryStore::new());
    let mut registry = bookclub_kernel::ModuleRegistry::new();
    bookclub_app::register_all(&mut registry, &store).expect("register modules");

    let document: utoipa::openapi::OpenApi =
        serde_json::from_value(bookclub_http::router::merged_openapi(&registry))
            .expect("valid OpenAPI document");
    assert!(document.paths.paths.contains_key("/books"));
    assert!(document.paths.paths.contains_key("/books/{id}"));
}
