use super::*;

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use chrono::Utc;
use tower::ServiceExt;

use fleetwatch_cache_memory::MemoryCache;
use fleetwatch_protocols::{CacheStore, TargetDescriptor, TargetRepository};
use fleetwatch_store_sqlite::{Owner, SqliteStore};

struct Fixture {
    cache: Arc<MemoryCache>,
    router: Router,
}

async fn fixture() -> Fixture {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    store.upsert_owner(Owner { id: 3, ..Default::default() }).await.unwrap();
    store
        .upsert_target(TargetDescriptor::network(1, "api", 3, "10.0.0.5", 80))
        .await
        .unwrap();
    store
        .record_statuses(&[StatusSnapshot::reachability(1, true, Utc::now())])
        .await
        .unwrap();

    let cache = Arc::new(MemoryCache::new());
    let status = Arc::new(StatusService::new(store, cache.clone(), Duration::from_secs(120)));
    Fixture {
        cache,
        router: create_router(ApiState { status }),
    }
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let f = fixture().await;
    let (status, body) = get_json(f.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_target_status_from_store_is_cached() {
    let f = fixture().await;

    let (status, body) = get_json(f.router, "/targets/1/status?owner=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target_id"], 1);
    assert_eq!(body["status"], "running");
    assert_eq!(f.cache.exists("status:1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_unknown_owner_is_not_found() {
    let f = fixture().await;
    let (status, body) = get_json(f.router, "/targets/1/status?owner=99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Status not found");
}

#[tokio::test]
async fn test_warm_cache_does_not_leak_to_other_owners() {
    let f = fixture().await;

    let (status, _) = get_json(f.router.clone(), "/targets/1/status?owner=3").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(f.router, "/targets/1/status?owner=99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("target_id").is_none());
}

#[tokio::test]
async fn test_corrupt_cache_entry_is_generic_500() {
    let f = fixture().await;
    f.cache
        .set("status:1", "{not json".to_string(), Duration::ZERO)
        .await
        .unwrap();

    let (status, body) = get_json(f.router, "/targets/1/status?owner=3").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal error");
}

#[tokio::test]
async fn test_missing_owner_query_is_rejected() {
    let f = fixture().await;
    let response = f
        .router
        .oneshot(Request::builder().uri("/targets/1/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
