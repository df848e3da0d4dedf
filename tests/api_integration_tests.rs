//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each admin endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use warm_cache::{api::create_router, AppState, Cache, CacheConfig};

// == Helper Functions ==

fn test_config() -> CacheConfig {
    CacheConfig::new(Duration::from_secs(300), Duration::from_secs(10))
}

fn create_test_app() -> Router {
    create_router(AppState::from_config(test_config()))
}

fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(request(
            "PUT",
            "/set",
            Some(r#"{"key":"account:1","value":{"cash":100}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"].as_str().unwrap(), "account:1");
}

#[tokio::test]
async fn test_set_endpoint_zero_ttl_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(request(
            "PUT",
            "/set",
            Some(r#"{"key":"k","value":1,"ttl":0}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_endpoint_huge_ttl_rejected() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/set",
            Some(r#"{"key":"k","value":1,"ttl":18446744073709551615}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());

    // The router keeps serving after the rejection
    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    app.clone()
        .oneshot(request(
            "PUT",
            "/set",
            Some(r#"{"key":"positions:7","value":[1,2,3]}"#),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request("GET", "/get/positions:7", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], json!([1, 2, 3]));
    assert_eq!(json["stale"], false);
}

#[tokio::test]
async fn test_get_endpoint_reports_stale() {
    let app = create_test_app();

    // TTL inside the 10s refresh buffer
    app.clone()
        .oneshot(request(
            "PUT",
            "/set",
            Some(r#"{"key":"short","value":"v","ttl":3}"#),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request("GET", "/get/short", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["stale"], true);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(request("GET", "/get/nonexistent", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(request("PUT", "/set", Some(r#"{"key":"gone","value":1}"#)))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("DELETE", "/del/gone", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/get/gone", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request("DELETE", "/del/gone", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == INVALIDATE / CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_endpoint_removes_prefix_only() {
    let cache = Arc::new(Cache::new(test_config()));
    for key in ["account:1", "account:2", "activities:1"] {
        cache.set(key, json!(key)).await;
    }
    let app = create_router(AppState::new(cache.clone()));

    let response = app
        .oneshot(request("DELETE", "/invalidate/account:", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["prefix"], "account:");
    assert_eq!(json["removed"], 2);
    assert!(cache.get("activities:1").await.is_some());
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_clear_endpoint() {
    let cache = Arc::new(Cache::new(test_config()));
    cache.set("a", json!(1)).await;
    cache.set("b", json!(2)).await;
    let app = create_router(AppState::new(cache.clone()));

    let response = app
        .oneshot(request("DELETE", "/clear", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(cache.is_empty().await);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(request(
            "PUT",
            "/set",
            Some(r#"{"key":"stats_key","value":"stats_value"}"#),
        ))
        .await
        .unwrap();
    // Hit
    app.clone()
        .oneshot(request("GET", "/get/stats_key", None))
        .await
        .unwrap();
    // Miss
    app.clone()
        .oneshot(request("GET", "/get/nonexistent", None))
        .await
        .unwrap();

    let response = app.oneshot(request("GET", "/stats", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["refreshes"].as_u64().unwrap(), 0);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["hit_rate"].as_f64().unwrap(), 0.5);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(request("PUT", "/set", Some(r#"{"invalid json"#)))
        .await
        .unwrap();

    // Axum returns 422 for JSON parsing errors by default
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = create_test_app();

    let response = app
        .oneshot(request("PUT", "/set", Some(r#"{"key":"","value":"test"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == TTL Expiration via API Tests ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/set",
            Some(r#"{"key":"ttl_test","value":"expires_soon","ttl":1}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/get/ttl_test", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = app
        .oneshot(request("GET", "/get/ttl_test", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Live Server Tests ==

#[tokio::test]
async fn test_live_server_round_trip() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cache = Arc::new(Cache::new(test_config()));
    let app = create_router(AppState::new(cache.clone()));
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let response = client
        .put(format!("{}/set", base))
        .json(&json!({"key": "account:42", "value": {"equity": 99.5}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = client
        .get(format!("{}/get/account:42", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["value"]["equity"], 99.5);

    let response = client
        .delete(format!("{}/invalidate/account:", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(cache.is_empty().await);

    server.abort();
    cache.stop().await.unwrap();
}
