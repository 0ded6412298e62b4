//! In-process scenario tests for llmb-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket,
//! driving it via `tower::ServiceExt::oneshot`. They require `DATABASE_URL`
//! since every route ultimately talks to Postgres; they no-op (pass
//! trivially) when it is unset.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use llmb_adapter::AdapterRegistry;
use llmb_daemon::{routes, state};
use tower::ServiceExt; // oneshot

async fn make_state() -> Option<Arc<state::AppState>> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = sqlx::postgres::PgPoolOptions::new().max_connections(4).connect(&url).await.ok()?;
    llmb_db::migrate(&pool).await.ok()?;
    Some(state::AppState::new(pool, AdapterRegistry::new(), 15.0))
}

async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp.into_body().collect().await.expect("body collect failed").to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

#[tokio::test]
async fn health_returns_200_ok_true() {
    let Some(st) = make_state().await else { return };
    let router = routes::build_router(st);
    let req = Request::builder().method("GET").uri("/v1/health").body(axum::body::Body::empty()).unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "llmb-daemon");
}

#[tokio::test]
async fn benchmark_init_returns_a_run_id() {
    let Some(st) = make_state().await else { return };
    let router = routes::build_router(st);
    let req = Request::builder()
        .method("POST")
        .uri("/api/benchmark/init?run_name=scenario-daemon&triggered_by=test")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert!(json["run_id"].is_string());
}

#[tokio::test]
async fn benchmark_process_returns_idle_on_an_empty_queue() {
    let Some(st) = make_state().await else { return };
    let router = routes::build_router(st);
    let req = Request::builder().method("GET").uri("/api/benchmark/process?batch_size=5").body(axum::body::Body::empty()).unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK, "batch endpoint always returns 200, even on an empty queue");
    let json = parse_json(body);
    assert_eq!(json["result"]["status"], "idle");
}

#[tokio::test]
async fn benchmark_status_for_a_fresh_run_is_all_zero() {
    let Some(st) = make_state().await else { return };
    let pool = st.pool.clone();
    let run_id = llmb_db::create_run(&pool, "scenario-daemon-status", "test").await.expect("create_run failed");

    let router = routes::build_router(st);
    let req = Request::builder().method("GET").uri(format!("/api/benchmark/status/{run_id}")).body(axum::body::Body::empty()).unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["pending"], 0);
    assert_eq!(json["completed"], 0);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let Some(st) = make_state().await else { return };
    let router = routes::build_router(st);
    let req = Request::builder().method("GET").uri("/v1/does_not_exist").body(axum::body::Body::empty()).unwrap();

    let (status, _) = call(router, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
