//! Shared data types for the benchmark queue engine.
//!
//! Pure data — no I/O, no persistence logic. `llmb-db` reads and writes these
//! shapes; `llmb-adapter` produces the `Envelope`; `llmb-queue` moves
//! everything between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Provider / Model / Price
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub base_url: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: Uuid,
    pub provider_id: Uuid,
    /// Always stored in normalized form — see `llmb_validator::normalize_model_name`.
    pub name: String,
    pub context_window: Option<i64>,
    pub active: bool,
    /// A property of the catalog, not of the name — drives the adapter's
    /// 60s/120s per-request timeout selection.
    pub is_reasoning: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub model_id: Uuid,
    pub input_per_m: f64,
    pub output_per_m: f64,
    pub timestamp: DateTime<Utc>,
}

/// Input/output $ per 1M tokens. What `llmb-pricing` resolves and what
/// `llmb-adapter` multiplies token counts by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceRate {
    pub input_per_m: f64,
    pub output_per_m: f64,
}

/// A pricing-table row as handed off by the (out-of-scope) scraper
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTableRow {
    pub provider_key: String,
    pub provider_name: String,
    pub model_name: String,
    pub input_per_m: f64,
    pub output_per_m: f64,
    pub context_window: Option<i64>,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub run_name: String,
    pub triggered_by: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// QueueItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Processing => "processing",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(QueueStatus::Pending),
            "processing" => Some(QueueStatus::Processing),
            "completed" => Some(QueueStatus::Completed),
            "failed" => Some(QueueStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    pub run_id: Uuid,
    pub provider_key: String,
    pub model_name: String,
    pub status: QueueStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
}

// ---------------------------------------------------------------------------
// BenchmarkResult / RunError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub id: Uuid,
    pub run_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    /// Legacy text fields kept alongside the FK columns — callers that only
    /// have the provider_key/model_name (e.g. before the catalog row exists)
    /// still get a fully-formed Result row.
    pub provider: String,
    pub model: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub reasoning_tokens: Option<i64>,
    pub total_latency_ms: f64,
    pub ttft_ms: Option<f64>,
    pub tps: Option<f64>,
    pub cost_usd: f64,
    pub status_code: Option<i32>,
    pub success: bool,
    pub error_message: Option<String>,
    pub response_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    pub id: Uuid,
    pub run_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub provider: String,
    pub model: String,
    pub error_type: String,
    pub error_message: String,
    pub status_code: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error taxonomy — literal strings stored in `error_type`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ConfigError,
    AuthError,
    BadRequest,
    NotFound,
    RateLimit,
    InsufficientCredits,
    Timeout,
    EmptyResponse,
    DependencyError,
    InitError,
    ProviderCrash,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigError => "CONFIG_ERROR",
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::InsufficientCredits => "INSUFFICIENT_CREDITS",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::EmptyResponse => "EMPTY_RESPONSE",
            ErrorKind::DependencyError => "DEPENDENCY_ERROR",
            ErrorKind::InitError => "INIT_ERROR",
            ErrorKind::ProviderCrash => "PROVIDER_CRASH",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Envelope — sum-typed result of a provider call
// ---------------------------------------------------------------------------

/// Metrics captured from a successful streaming call, before cost is priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallMetrics {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub reasoning_tokens: Option<i64>,
    pub total_latency_ms: f64,
    pub ttft_ms: Option<f64>,
    pub tps: Option<f64>,
}

/// The standard result of one Provider Adapter call.
///
/// Modeled as a tagged variant rather than a struct of optionals plus a
/// `success: bool` flag. Persistence projects this into the flat
/// `BenchmarkResult` / `RunError` rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Envelope {
    Ok {
        metrics: CallMetrics,
        cost_usd: f64,
        status_code: Option<i32>,
        response_text: Option<String>,
    },
    Err {
        kind: ErrorKind,
        status_code: Option<i32>,
        message: String,
    },
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Ok { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Envelope::Err { kind, .. } => Some(*kind),
            Envelope::Ok { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_status_round_trips_through_str() {
        for s in ["pending", "processing", "completed", "failed"] {
            let parsed = QueueStatus::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn queue_status_rejects_unknown() {
        assert!(QueueStatus::parse("bogus").is_none());
    }

    #[test]
    fn envelope_is_ok_discriminates_variants() {
        let ok = Envelope::Ok {
            metrics: CallMetrics {
                input_tokens: 1,
                output_tokens: 1,
                reasoning_tokens: None,
                total_latency_ms: 1.0,
                ttft_ms: None,
                tps: None,
            },
            cost_usd: 0.0,
            status_code: Some(200),
            response_text: None,
        };
        let err = Envelope::Err {
            kind: ErrorKind::RateLimit,
            status_code: Some(429),
            message: "rate limited".to_string(),
        };
        assert!(ok.is_ok());
        assert!(!err.is_ok());
        assert_eq!(err.error_kind(), Some(ErrorKind::RateLimit));
        assert_eq!(ok.error_kind(), None);
    }

    #[test]
    fn error_kind_as_str_matches_taxonomy_literals() {
        assert_eq!(ErrorKind::RateLimit.as_str(), "RATE_LIMIT");
        assert_eq!(ErrorKind::InsufficientCredits.as_str(), "INSUFFICIENT_CREDITS");
    }
}
