//! Axum router and all HTTP handlers for llmb-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    api_types::{
        ApiErrorResponse, HealthResponse, InitQuery, InitResponse, ProcessQuery, ProcessResponse,
    },
    state::{AppState, BusMsg},
};

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/stream", get(stream))
        .route("/api/benchmark/init", get(benchmark_init).post(benchmark_init))
        .route("/api/benchmark/process", get(benchmark_process).post(benchmark_process))
        .route("/api/benchmark/status/:run_id", get(benchmark_status))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { ok: true, service: st.build.service, version: st.build.version }))
}

// ---------------------------------------------------------------------------
// GET|POST /api/benchmark/init
// ---------------------------------------------------------------------------

pub(crate) async fn benchmark_init(
    State(st): State<Arc<AppState>>,
    Query(q): Query<InitQuery>,
) -> Response {
    match llmb_queue::init_benchmark_queue(&st.pool, &q.run_name, &q.triggered_by).await {
        Ok(run_id) => {
            info!(%run_id, "benchmark queue initialized");
            (StatusCode::OK, Json(InitResponse { run_id })).into_response()
        }
        Err(err) => {
            error!(error = %err, "init_benchmark_queue failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiErrorResponse { error: err.to_string() })).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET|POST /api/benchmark/process?batch_size=10
// ---------------------------------------------------------------------------

pub(crate) async fn benchmark_process(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ProcessQuery>,
) -> Response {
    // Batch endpoints always return 200 with a structured outcome — a 5xx
    // here means the coordinator itself failed, not one benchmark.
    match llmb_queue::run_benchmark_batch(&st.pool, &st.registry, st.budget_cap_usd, q.batch_size).await {
        Ok(outcome) => {
            let _ = st.bus.send(BusMsg::LogLine { level: "INFO".to_string(), msg: format!("batch outcome: {outcome:?}") });
            (StatusCode::OK, Json(ProcessResponse { result: outcome, queue_stats: None })).into_response()
        }
        Err(err) => {
            error!(error = %err, "run_benchmark_batch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiErrorResponse { error: err.to_string() })).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /api/benchmark/status/{run_id}
// ---------------------------------------------------------------------------

pub(crate) async fn benchmark_status(State(st): State<Arc<AppState>>, Path(run_id): Path<Uuid>) -> Response {
    match llmb_queue::get_run_queue_stats(&st.pool, run_id).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => {
            error!(error = %err, %run_id, "get_run_queue_stats failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiErrorResponse { error: err.to_string() })).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(rx: broadcast::Receiver<BusMsg>) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
