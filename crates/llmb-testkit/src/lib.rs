//! Test-only fixtures shared across `llmb-*` integration tests: a
//! scriptable fake [`ProviderAdapter`](llmb_adapter::ProviderAdapter) and an
//! ephemeral-Postgres-pool bootstrap helper.
//!
//! MUST NOT be depended on by any production binary — it exists purely to
//! stand in for real provider HTTP calls and real DB setup in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use llmb_adapter::{ModelClass, ProviderAdapter};
use llmb_schemas::{Envelope, PriceRate};
use sqlx::PgPool;

/// Connects to `database_url` and applies migrations — the common prelude
/// every DB-backed scenario test needs before touching `llmb-db`.
pub async fn ephemeral_pool(database_url: &str) -> Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await
        .context("ephemeral_pool: connect failed")?;
    llmb_db::migrate(&pool).await.context("ephemeral_pool: migrate failed")?;
    Ok(pool)
}

/// A [`ProviderAdapter`] that replays a fixed script of envelopes, one per
/// call, then falls back to a final catch-all envelope once exhausted.
///
/// A queue of canned responses consumed in order, with call count exposed
/// for assertions.
pub struct ScriptedAdapter {
    script: Mutex<Vec<Envelope>>,
    exhausted: Envelope,
    calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new(script: Vec<Envelope>) -> Self {
        Self {
            script: Mutex::new(script),
            exhausted: Envelope::Err {
                kind: llmb_schemas::ErrorKind::UnknownError,
                status_code: Some(500),
                message: "ScriptedAdapter: script exhausted".to_string(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    /// Always returns the same envelope, forever.
    pub fn repeating(envelope: Envelope) -> Self {
        Self { script: Mutex::new(Vec::new()), exhausted: envelope, calls: AtomicUsize::new(0) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    async fn call(&self, _prompt: &str, _model: &str, _class: ModelClass, _rate: PriceRate) -> Envelope {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            clone_envelope(&self.exhausted)
        } else {
            script.remove(0)
        }
    }
}

fn clone_envelope(e: &Envelope) -> Envelope {
    match e {
        Envelope::Ok { metrics, cost_usd, status_code, response_text } => Envelope::Ok {
            metrics: llmb_schemas::CallMetrics {
                input_tokens: metrics.input_tokens,
                output_tokens: metrics.output_tokens,
                reasoning_tokens: metrics.reasoning_tokens,
                total_latency_ms: metrics.total_latency_ms,
                ttft_ms: metrics.ttft_ms,
                tps: metrics.tps,
            },
            cost_usd: *cost_usd,
            status_code: *status_code,
            response_text: response_text.clone(),
        },
        Envelope::Err { kind, status_code, message } => {
            Envelope::Err { kind: *kind, status_code: *status_code, message: message.clone() }
        }
    }
}

/// Builds a standard successful [`Envelope`] for tests that don't care about
/// the exact metrics, only that the call succeeded.
pub fn ok_envelope(input_tokens: i64, output_tokens: i64, response_text: &str) -> Envelope {
    Envelope::Ok {
        metrics: llmb_schemas::CallMetrics {
            input_tokens,
            output_tokens,
            reasoning_tokens: None,
            total_latency_ms: 100.0,
            ttft_ms: Some(20.0),
            tps: Some(output_tokens as f64 / 0.1),
        },
        cost_usd: 0.0,
        status_code: Some(200),
        response_text: Some(response_text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_adapter_plays_back_in_order_then_repeats_the_exhausted_envelope() {
        let adapter = ScriptedAdapter::new(vec![ok_envelope(10, 1, "first")]);
        let rate = PriceRate { input_per_m: 1.0, output_per_m: 1.0 };

        let first = adapter.call("p", "m", ModelClass::Standard, rate).await;
        assert!(first.is_ok());

        let second = adapter.call("p", "m", ModelClass::Standard, rate).await;
        assert!(!second.is_ok());

        assert_eq!(adapter.call_count(), 2);
    }

    #[tokio::test]
    async fn repeating_adapter_never_exhausts() {
        let adapter = ScriptedAdapter::repeating(ok_envelope(5, 5, "steady"));
        let rate = PriceRate { input_per_m: 1.0, output_per_m: 1.0 };
        for _ in 0..3 {
            assert!(adapter.call("p", "m", ModelClass::Standard, rate).await.is_ok());
        }
        assert_eq!(adapter.call_count(), 3);
    }
}
