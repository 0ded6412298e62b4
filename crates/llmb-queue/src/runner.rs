//! Queue Runner: drives Run creation through Result/Error persistence under
//! concurrency, retry, and budget constraints.

use anyhow::{Context, Result};
use llmb_adapter::{AdapterRegistry, ModelClass};
use llmb_schemas::{Envelope, ErrorKind, QueueStats};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::prompt::BENCHMARK_PROMPT;
use crate::run::RunManager;

pub const MIN_BATCH_SIZE: i64 = 1;
pub const MAX_BATCH_SIZE: i64 = 50;
pub const DEFAULT_BATCH_SIZE: i64 = 10;

/// Starts a new Run and populates the queue from the active model catalog.
/// Does no dispatch work itself.
pub async fn init_benchmark_queue(pool: &PgPool, run_name: &str, triggered_by: &str) -> Result<Uuid> {
    let run_id = RunManager::start(pool, run_name, triggered_by).await?;
    let catalog = llmb_db::list_active_model_catalog(pool).await?;
    llmb_db::enqueue_benchmarks(pool, run_id, &catalog).await?;
    Ok(run_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum BatchOutcome {
    Aborted { reason: &'static str, processed: u32, successful: u32, failed: u32 },
    Idle { processed: u32, successful: u32, failed: u32 },
    Completed { processed: u32, successful: u32, failed: u32 },
}

/// Runs one batch of pending items to completion. Processes items
/// sequentially — simpler and gives deterministic TPS measurements, traded
/// off deliberately against a bounded parallel fan-out.
pub async fn run_benchmark_batch(
    pool: &PgPool,
    registry: &AdapterRegistry,
    budget_cap_usd: f64,
    batch_size: i64,
) -> Result<BatchOutcome> {
    anyhow::ensure!(
        (MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&batch_size),
        "batch_size must be in [{MIN_BATCH_SIZE}, {MAX_BATCH_SIZE}], got {batch_size}"
    );

    let budget = llmb_budget::check_budget(pool, budget_cap_usd).await;
    if budget.should_abort {
        tracing::warn!(status_line = %budget.status_line(), "budget exceeded, aborting batch");
        return Ok(BatchOutcome::Aborted { reason: "budget_exceeded", processed: 0, successful: 0, failed: 0 });
    }

    let items = llmb_db::get_pending_queue_items(pool, batch_size).await?;
    if items.is_empty() {
        return Ok(BatchOutcome::Idle { processed: 0, successful: 0, failed: 0 });
    }

    let mut successful = 0u32;
    let mut failed = 0u32;

    for item in items {
        if item.attempts >= item.max_attempts {
            let _ = llmb_db::mark_queue_item_failed(pool, item.id, "Max retry attempts exceeded").await;
            failed += 1;
            continue;
        }

        let claimed = llmb_db::mark_queue_item_processing(pool, item.id).await?;
        if !claimed {
            // Lost the race to another batch worker — not this worker's item.
            continue;
        }

        match process_one(pool, registry, &item.provider_key, &item.model_name, item.run_id).await {
            Ok(ProcessOutcome::Success) => {
                llmb_db::mark_queue_item_completed(pool, item.id).await?;
                successful += 1;
            }
            Ok(ProcessOutcome::Failure(message)) => {
                let _ = llmb_db::mark_queue_item_failed(pool, item.id, &message).await;
                failed += 1;
            }
            Err(err) => {
                tracing::error!(error = %err, item_id = %item.id, "unexpected error processing queue item");
                let _ = llmb_db::mark_queue_item_failed(pool, item.id, &err.to_string()).await;
                failed += 1;
            }
        }
    }

    let processed = successful + failed;
    Ok(BatchOutcome::Completed { processed, successful, failed })
}

enum ProcessOutcome {
    Success,
    Failure(String),
}

async fn process_one(
    pool: &PgPool,
    registry: &AdapterRegistry,
    provider_key: &str,
    model_name: &str,
    run_id: Uuid,
) -> Result<ProcessOutcome> {
    let Some(adapter) = registry.get(provider_key) else {
        let message = format!("no adapter registered for provider_key '{provider_key}'");
        llmb_db::save_run_error(
            pool,
            llmb_db::NewRunError {
                run_id,
                provider_id: None,
                model_id: None,
                provider: provider_key.to_string(),
                model: model_name.to_string(),
                error_kind: ErrorKind::InitError,
                error_message: message.clone(),
                status_code: None,
            },
        )
        .await?;
        return Ok(ProcessOutcome::Failure(message));
    };

    let provider_id = llmb_db::get_or_create_provider(pool, provider_key, None, None).await?;
    let model_id = llmb_db::get_or_create_model(pool, provider_id, model_name, None).await?;
    let model_row = llmb_db::get_model_by_id(pool, model_id).await?.context("model row must exist after get_or_create_model")?;
    let model_class = if model_row.is_reasoning { ModelClass::Reasoning } else { ModelClass::Standard };

    let rate = llmb_pricing::get_pricing(pool, provider_key, provider_key, &model_row.name).await?;

    let envelope = adapter.call(BENCHMARK_PROMPT, &model_row.name, model_class, rate).await;

    match envelope {
        Envelope::Err { kind, status_code, message } => {
            llmb_db::save_run_error(
                pool,
                llmb_db::NewRunError {
                    run_id,
                    provider_id: Some(provider_id),
                    model_id: Some(model_id),
                    provider: provider_key.to_string(),
                    model: model_row.name.clone(),
                    error_kind: kind,
                    error_message: message.clone(),
                    status_code,
                },
            )
            .await?;
            Ok(ProcessOutcome::Failure(message))
        }
        Envelope::Ok { metrics, cost_usd, status_code, response_text } => {
            llmb_db::save_benchmark(
                pool,
                llmb_db::NewBenchmark {
                    run_id,
                    provider_id: Some(provider_id),
                    model_id: Some(model_id),
                    provider: provider_key.to_string(),
                    model: model_row.name.clone(),
                    input_tokens: Some(metrics.input_tokens),
                    output_tokens: Some(metrics.output_tokens),
                    reasoning_tokens: metrics.reasoning_tokens,
                    total_latency_ms: metrics.total_latency_ms,
                    ttft_ms: metrics.ttft_ms,
                    tps: metrics.tps,
                    cost_usd,
                    status_code,
                    response_text,
                    prompt: Some(BENCHMARK_PROMPT.to_string()),
                },
            )
            .await?;
            Ok(ProcessOutcome::Success)
        }
    }
}

pub async fn get_run_queue_stats(pool: &PgPool, run_id: Uuid) -> Result<QueueStats> {
    llmb_db::get_queue_stats(pool, run_id).await
}
