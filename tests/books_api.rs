//! End-to-end checks against the fully assembled router.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use library_kernel::settings::{IdAssignment, Settings, UpdateMode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(settings: &Settings) -> Router {
    let registry = library_api::build_registry(settings).unwrap();
    library_http::build_router(&registry, settings)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_of(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn list(app: &Router) -> Vec<Value> {
    let response = call(app, Method::GET, "/books", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    json_of(response).await.as_array().unwrap().clone()
}

#[tokio::test]
async fn scenario_a_lookup() {
    let app = app(&Settings::default());

    let response = call(&app, Method::GET, "/books/2", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let book = json_of(response).await;
    assert_eq!(book["id"], 2);
    assert_eq!(book["title"], "Book Title 2");

    let response = call(&app, Method::GET, "/books/99", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scenario_b_create_without_id() {
    let app = app(&Settings::default());
    assert_eq!(list(&app).await.len(), 3);

    let response = call(
        &app,
        Method::POST,
        "/books",
        Some(json!({"title": "New", "author": "X"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_of(response).await;
    assert_eq!(created, json!({"title": "New", "author": "X"}));
    assert!(created.get("id").is_none());

    let books = list(&app).await;
    assert_eq!(books.len(), 4);
    assert_eq!(books[3], created);
}

#[tokio::test]
async fn scenario_c_update_is_not_persisted() {
    let app = app(&Settings::default());
    let before = json_of(call(&app, Method::GET, "/books/1", None).await).await;
    let fields = json!({
        "title": "Changed",
        "author": "A",
        "publicationDate": "2022-01-15",
        "genre": "Fiction",
        "available": true
    });

    let response = call(&app, Method::PUT, "/books/1", Some(fields.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(response).await, fields);

    let after = json_of(call(&app, Method::GET, "/books/1", None).await).await;
    assert_eq!(after, before);
    assert_eq!(after["title"], "Book Title 1");
}

#[tokio::test]
async fn update_miss_keeps_listing_identical() {
    let app = app(&Settings::default());
    let before = list(&app).await;

    let body = Some(json!({"title": "x"}));
    let response = call(&app, Method::PUT, "/books/404", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(list(&app).await, before);
}

#[tokio::test]
async fn created_order_is_listing_order() {
    let app = app(&Settings::default());
    for id in [30, 10, 20] {
        let response = call(&app, Method::POST, "/books", Some(json!({"id": id}))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let ids: Vec<_> = list(&app)
        .await
        .iter()
        .map(|book| book["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 30, 10, 20]);
}

#[tokio::test]
async fn deviation_switches_change_behavior() {
    let mut settings = Settings::default();
    settings.books.update_mode = UpdateMode::WriteBack;
    settings.books.id_assignment = IdAssignment::Sequential;
    let app = app(&settings);

    let response = call(&app, Method::POST, "/books", Some(json!({"title": "T"}))).await;
    let created = json_of(response).await;
    assert_eq!(created, json!({"id": 4, "title": "T"}));

    let response = call(&app, Method::PUT, "/books/4", Some(json!({"title": "U"}))).await;
    assert_eq!(json_of(response).await, json!({"id": 4, "title": "U"}));
    let stored = json_of(call(&app, Method::GET, "/books/4", None).await).await;
    assert_eq!(stored["title"], "U");
}

#[tokio::test]
async fn unseeded_store_starts_empty() {
    let mut settings = Settings::default();
    settings.books.seed = false;
    let app = app(&settings);

    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn ambient_endpoints_are_served() {
    let app = app(&Settings::default());

    let response = call(&app, Method::GET, "/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let doc = json_of(call(&app, Method::GET, "/docs/openapi.json", None).await).await;
    assert_eq!(doc["info"]["title"], "Library API");
    assert!(doc["paths"]["/books"]["post"].is_object());
    assert!(doc["paths"]["/books/{id}"]["put"].is_object());
    assert!(doc["components"]["schemas"]["Book"].is_object());
    assert!(doc["paths"].get("/books/health").is_none());

    let response = call(&app, Method::GET, "/api-docs/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_under_books_is_just_an_unknown_id() {
    let app = app(&Settings::default());

    let response = call(&app, Method::GET, "/books/health", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_of(response).await["error"]["message"], "Book not Found");

    let body = Some(json!({"title": "x"}));
    let response = call(&app, Method::PUT, "/books/health", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trailing_slash_paths_are_served() {
    let app = app(&Settings::default());

    let response = call(&app, Method::GET, "/books/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(response).await.as_array().unwrap().len(), 3);

    let response = call(&app, Method::GET, "/books/2/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(response).await["id"], 2);
}

#[tokio::test]
async fn bodiless_writes_act_on_an_empty_record() {
    let app = app(&Settings::default());

    let response = call(&app, Method::PUT, "/books/1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(response).await, json!({}));

    let response = call(&app, Method::POST, "/books", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let books = list(&app).await;
    assert_eq!(books.len(), 4);
    assert_eq!(books[3], json!({}));
}

#[tokio::test]
async fn null_fields_are_stored_and_echoed() {
    let app = app(&Settings::default());
    let fields = json!({"title": null, "author": "X"});

    let response = call(&app, Method::POST, "/books", Some(fields.clone())).await;
    assert_eq!(json_of(response).await, fields);
    assert_eq!(list(&app).await[3], fields);
}

#[tokio::test]
async fn run_serves_until_shutdown() {
    let mut settings = Settings::default();
    settings.server.host = "127.0.0.1".to_string();
    settings.server.port = 0;

    library_api::run(settings, async {}).await.unwrap();
}
