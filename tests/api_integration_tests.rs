//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each administration endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use query_cache::{api::create_router, AppState, CacheConfig, SharedCache};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::from_config(&CacheConfig::default()))
}

fn create_app_with_cache() -> (Router, SharedCache) {
    let cache = SharedCache::from_config(CacheConfig::default());
    (create_router(AppState::new(cache.clone())), cache)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let response = create_test_app()
        .oneshot(put_json("/set", json!({"key": "test_key", "value": {"rows": [1, 2]}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_with_ttl_expires() {
    let (app, cache) = create_app_with_cache();

    let response = app
        .clone()
        .oneshot(put_json(
            "/set",
            json!({"key": "ttl_key", "value": "ttl_value", "ttl_ms": 50}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(cache.has("ttl_key").await);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let response = app.oneshot(get("/get/ttl_key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_endpoint_validation_error() {
    let response = create_test_app()
        .oneshot(put_json("/set", json!({"key": "", "value": 1})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    let set_response = app
        .clone()
        .oneshot(put_json("/set", json!({"key": "get_key", "value": {"id": 7}})))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get("/get/get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], json!({"id": 7}));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let response = create_test_app()
        .oneshot(get("/get/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let (app, cache) = create_app_with_cache();
    cache.set("del_key", "value", None).await;

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri("/del/del_key")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!cache.has("del_key").await);

    let response = app.oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == STATS / ANALYTICS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_tracks_hits_and_misses() {
    let (app, cache) = create_app_with_cache();
    cache.set("k", "v", None).await;
    let _: Option<String> = cache.get("k").await;
    let _: Option<String> = cache.get("missing").await;

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["size"], 1);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["hit_rate"], 0.5);
    assert!(json["memory_usage"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_analytics_endpoint() {
    let (app, cache) = create_app_with_cache();
    cache.set("hot", "v", None).await;
    cache.set("cold", "v", None).await;
    for _ in 0..3 {
        let _: Option<String> = cache.get("hot").await;
    }

    let response = app.oneshot(get("/analytics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["top_keys"][0]["key"], "hot");
    assert_eq!(json["top_keys"][0]["hits"], 3);
    assert_eq!(json["sizes"]["under_1kb"], 2);
    assert_eq!(json["expiration"]["over_1h"], 0);
}

// == INVALIDATE Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_endpoint() {
    let (app, cache) = create_app_with_cache();
    cache.set("orders:1", &1, None).await;
    cache.set("orders:2", &2, None).await;
    cache.set("users:1", &3, None).await;

    let response = app
        .clone()
        .oneshot(post_json("/invalidate", json!({"pattern": "^orders:"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 2);
    assert!(cache.has("users:1").await);

    let response = app
        .oneshot(post_json("/invalidate", json!({"pattern": "(unclosed"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == FINGERPRINT Endpoint Tests ==

#[tokio::test]
async fn test_fingerprint_endpoint_is_order_independent() {
    let app = create_test_app();

    let first = app
        .clone()
        .oneshot(post_json(
            "/fingerprint",
            json!({"operation": "listOrders", "variables": {"a": 1, "b": {"c": 2, "d": 3}}}),
        ))
        .await
        .unwrap();
    let second = app
        .oneshot(post_json(
            "/fingerprint",
            json!({"operation": "listOrders", "variables": {"b": {"d": 3, "c": 2}, "a": 1}}),
        ))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    let first = body_to_json(first.into_body()).await;
    let second = body_to_json(second.into_body()).await;
    assert_eq!(first["key"], second["key"]);
    assert_eq!(first["key"].as_str().unwrap().len(), 32);
}

#[tokio::test]
async fn test_fingerprint_endpoint_with_prefix_and_user() {
    let response = create_test_app()
        .oneshot(post_json(
            "/fingerprint",
            json!({
                "operation": "getProfile",
                "include_user": true,
                "user_id": "u1",
                "prefix": "profile"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["key"].as_str().unwrap().starts_with("profile:"));
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let response = create_test_app().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let response = create_test_app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
