//! Request and response types for all llmb-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests. No business logic lives here.

use llmb_queue::BatchOutcome;
use llmb_schemas::QueueStats;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

/// Body rejected by a route's query-parameter validation — the management
/// API's own failures are distinct from per-benchmark ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitQuery {
    #[serde(default = "default_run_name")]
    pub run_name: String,
    #[serde(default = "default_triggered_by")]
    pub triggered_by: String,
}

fn default_run_name() -> String {
    "scheduled".to_string()
}

fn default_triggered_by() -> String {
    "api".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct InitResponse {
    pub run_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessQuery {
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
}

fn default_batch_size() -> i64 {
    llmb_queue::DEFAULT_BATCH_SIZE
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub result: BatchOutcome,
    pub queue_stats: Option<QueueStats>,
}
