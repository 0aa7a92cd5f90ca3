// Common test utilities shared across test files

use axum::{body::Body, http::Request, response::Response};
use http_body_util::BodyExt;
use page_compiler::{
    config::PageCatalog,
    services::{InMemoryQueryCache, PageService},
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

pub const TEST_PAGES: &str = r#"
- id: users
  title: Users
  blocks:
    - type: text
      content: "Hello {{ query.user.data.name }}"
    - type: loop
      id: items
      data: query.list.data
      blocks:
        - type: text
          content: "{{ loop.items.0 }}/{{ item.items }}"
    - type: table
      id: rows
      data: "{{ query.people.data }}"
      columns:
        - header: Name
          cell: "{{ item.rows.name }}"
    - type: loop
      id: broken
      data: query.user.data.name
      blocks: []
- id: search
  title: Search
  blocks:
    - type: form
      id: find
      action: "/find/{{ this.q }}?by={{ query.user.data.name }}"
      fields:
        - name: q
          label: Search for
          required: true
"#;

/// Query cache contents the test pages are written against
#[allow(dead_code)]
pub fn test_cache() -> Arc<InMemoryQueryCache> {
    let cache = Arc::new(InMemoryQueryCache::new());
    cache.put("user", json!({"data": {"name": "John", "admin": true, "age": 42}}));
    cache.put("list", json!({"data": ["a", "b"]}));
    cache.put("people", json!({"data": [{"name": "Ann"}, {"name": "<Bob>"}]}));
    cache
}

/// Create a test Axum router for integration tests
#[allow(dead_code)]
pub fn create_test_app() -> axum::Router {
    let catalog = PageCatalog::parse(TEST_PAGES).expect("test pages are valid");
    let state = AppState::new(PageService::new(catalog.pages, test_cache()));
    page_compiler::create_router(Arc::new(state))
}

#[allow(dead_code)]
pub async fn send(app: axum::Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
