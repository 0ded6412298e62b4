//! Postgres-backed persistence contract for the benchmark queue engine.
//!
//! Every operation here returns `anyhow::Result`; callers at the boundary
//! (HTTP handlers, the queue runner) log-and-degrade rather than unwind —
//! matching the contract's "never propagates as unchecked failures" rule.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use llmb_schemas::{
    BenchmarkResult, ErrorKind, PriceRate, QueueItem, QueueStats, QueueStatus, RunError,
};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

pub const ENV_DB_URL: &str = "DATABASE_URL";

/// Connect to Postgres using `DATABASE_URL`.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url).await
}

pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_runs_table: bool,
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (bool,) = sqlx::query_as(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema = 'public' and table_name = 'runs'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_runs_table: exists,
    })
}

// ---------------------------------------------------------------------------
// Run lifecycle
// ---------------------------------------------------------------------------

pub async fn create_run(pool: &PgPool, run_name: &str, triggered_by: &str) -> Result<Uuid> {
    let run_id = Uuid::new_v4();
    sqlx::query(
        r#"
        insert into runs (id, run_name, triggered_by, started_at)
        values ($1, $2, $3, now())
        "#,
    )
    .bind(run_id)
    .bind(run_name)
    .bind(triggered_by)
    .execute(pool)
    .await
    .context("create_run failed")?;
    Ok(run_id)
}

pub async fn finish_run(pool: &PgPool, run_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        update runs
           set finished_at = now()
         where id = $1
           and finished_at is null
        "#,
    )
    .bind(run_id)
    .execute(pool)
    .await
    .context("finish_run failed")?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Provider / Model catalog
// ---------------------------------------------------------------------------

pub async fn get_or_create_provider(
    pool: &PgPool,
    name: &str,
    base_url: Option<&str>,
    logo_url: Option<&str>,
) -> Result<Uuid> {
    if let Some(row) = sqlx::query("select id from providers where name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("get_or_create_provider lookup failed")?
    {
        return row.try_get::<Uuid, _>("id").context("decode provider id");
    }

    let id = Uuid::new_v4();
    let row = sqlx::query(
        r#"
        insert into providers (id, name, base_url, logo_url)
        values ($1, $2, $3, $4)
        on conflict (name) do update set name = excluded.name
        returning id
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(base_url)
    .bind(logo_url)
    .fetch_one(pool)
    .await
    .context("get_or_create_provider insert failed")?;

    row.try_get::<Uuid, _>("id").context("decode provider id")
}

/// Looks up or creates a model row. Applies name normalization before the
/// lookup/insert so `(provider_id, name)` stays a stable catalog key.
pub async fn get_or_create_model(
    pool: &PgPool,
    provider_id: Uuid,
    raw_name: &str,
    context_window: Option<i64>,
) -> Result<Uuid> {
    let normalized = llmb_validator::normalize_model_name(raw_name);

    if let Some(row) = sqlx::query("select id from models where provider_id = $1 and name = $2")
        .bind(provider_id)
        .bind(&normalized)
        .fetch_optional(pool)
        .await
        .context("get_or_create_model lookup failed")?
    {
        return row.try_get::<Uuid, _>("id").context("decode model id");
    }

    let id = Uuid::new_v4();
    let row = sqlx::query(
        r#"
        insert into models (id, provider_id, name, context_window, active, is_reasoning, last_seen_at)
        values ($1, $2, $3, $4, false, false, now())
        on conflict (provider_id, name) do update set last_seen_at = excluded.last_seen_at
        returning id
        "#,
    )
    .bind(id)
    .bind(provider_id)
    .bind(&normalized)
    .bind(context_window)
    .fetch_one(pool)
    .await
    .context("get_or_create_model insert failed")?;

    row.try_get::<Uuid, _>("id").context("decode model id")
}

/// Flags a model as a reasoning model, which drives the adapter's 120s
/// timeout selection. A catalog property, set once by whoever curates the
/// active-model list — never inferred from the name.
pub async fn set_model_reasoning_flag(pool: &PgPool, model_id: Uuid, is_reasoning: bool) -> Result<bool> {
    let result = sqlx::query("update models set is_reasoning = $2 where id = $1")
        .bind(model_id)
        .bind(is_reasoning)
        .execute(pool)
        .await
        .context("set_model_reasoning_flag failed")?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_model_by_id(pool: &PgPool, model_id: Uuid) -> Result<Option<llmb_schemas::Model>> {
    let row = sqlx::query(
        r#"
        select id, provider_id, name, context_window, active, is_reasoning, last_seen_at
        from models
        where id = $1
        "#,
    )
    .bind(model_id)
    .fetch_optional(pool)
    .await
    .context("get_model_by_id failed")?;

    row.map(model_from_row).transpose()
}

/// Inserts/refreshes discovered models with `active=false`. Idempotent per
/// `(provider_id, normalized name)`.
pub async fn upsert_models_from_discovery(
    pool: &PgPool,
    provider_id: Uuid,
    raw_names: &[String],
) -> Result<bool> {
    for raw_name in raw_names {
        get_or_create_model(pool, provider_id, raw_name, None).await?;
    }
    Ok(true)
}

/// Atomically clears `active` for all of a provider's models, then sets
/// `active=true` for the given (already-normalized) names. A single
/// transaction so no reader observes a moment with zero active models.
pub async fn set_models_active(pool: &PgPool, provider_id: Uuid, names: &[String]) -> Result<bool> {
    let mut tx = pool.begin().await.context("set_models_active begin tx failed")?;

    sqlx::query("update models set active = false where provider_id = $1")
        .bind(provider_id)
        .execute(&mut *tx)
        .await
        .context("set_models_active clear failed")?;

    if !names.is_empty() {
        sqlx::query(
            r#"
            update models
               set active = true
             where provider_id = $1
               and name = any($2)
            "#,
        )
        .bind(provider_id)
        .bind(names)
        .execute(&mut *tx)
        .await
        .context("set_models_active set failed")?;
    }

    tx.commit().await.context("set_models_active commit failed")?;
    Ok(true)
}

pub async fn list_models(pool: &PgPool, provider_id: Uuid) -> Result<Vec<llmb_schemas::Model>> {
    let rows = sqlx::query(
        r#"
        select id, provider_id, name, context_window, active, is_reasoning, last_seen_at
        from models
        where provider_id = $1
        order by name asc
        "#,
    )
    .bind(provider_id)
    .fetch_all(pool)
    .await
    .context("list_models failed")?;

    rows.into_iter().map(model_from_row).collect()
}

/// The `(provider_key, model_name)` catalog consumed by `init_benchmark_queue`.
/// `provider_key` is the provider's stored `name`, which doubles as the
/// registry key adapters and env-var lookups use.
pub async fn list_active_model_catalog(pool: &PgPool) -> Result<Vec<(String, String)>> {
    let rows = sqlx::query(
        r#"
        select pr.name as provider_key, m.name as model_name
        from models m
        join providers pr on pr.id = m.provider_id
        where m.active = true
        order by pr.name asc, m.name asc
        "#,
    )
    .fetch_all(pool)
    .await
    .context("list_active_model_catalog failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push((row.try_get("provider_key")?, row.try_get("model_name")?));
    }
    Ok(out)
}

pub async fn list_all_models(pool: &PgPool) -> Result<Vec<llmb_schemas::Model>> {
    let rows = sqlx::query(
        r#"
        select id, provider_id, name, context_window, active, is_reasoning, last_seen_at
        from models
        order by provider_id asc, name asc
        "#,
    )
    .fetch_all(pool)
    .await
    .context("list_all_models failed")?;

    rows.into_iter().map(model_from_row).collect()
}

/// Renames one model row to `new_name` in place. Returns `false` (no-op,
/// logged by the caller) instead of erroring when `new_name` collides with
/// an existing `(provider_id, name)` row — the original migration script's
/// behavior for models that normalize to an already-claimed name.
pub async fn rename_model(pool: &PgPool, model_id: Uuid, new_name: &str) -> Result<bool> {
    let result = sqlx::query("update models set name = $2 where id = $1")
        .bind(model_id)
        .bind(new_name)
        .execute(pool)
        .await;

    match result {
        Ok(r) => Ok(r.rows_affected() > 0),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(false),
        Err(e) => Err(e).context("rename_model failed"),
    }
}

fn model_from_row(row: sqlx::postgres::PgRow) -> Result<llmb_schemas::Model> {
    Ok(llmb_schemas::Model {
        id: row.try_get("id")?,
        provider_id: row.try_get("provider_id")?,
        name: row.try_get("name")?,
        context_window: row.try_get("context_window")?,
        active: row.try_get("active")?,
        is_reasoning: row.try_get("is_reasoning")?,
        last_seen_at: row.try_get("last_seen_at")?,
    })
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

pub async fn get_model_pricing(
    pool: &PgPool,
    provider_name: &str,
    model_name: &str,
) -> Result<Option<PriceRate>> {
    let normalized = llmb_validator::normalize_model_name(model_name);

    let row = sqlx::query(
        r#"
        select p.input_per_m, p.output_per_m
        from prices p
        join providers pr on pr.id = p.provider_id
        join models m on m.id = p.model_id
        where pr.name = $1 and m.name = $2
        order by p."timestamp" desc
        limit 1
        "#,
    )
    .bind(provider_name)
    .bind(&normalized)
    .fetch_optional(pool)
    .await
    .context("get_model_pricing failed")?;

    let Some(row) = row else { return Ok(None) };

    Ok(Some(PriceRate {
        input_per_m: row.try_get("input_per_m")?,
        output_per_m: row.try_get("output_per_m")?,
    }))
}

const PRICE_SUPPRESSION_WINDOW_HOURS: i64 = 24;

/// Writes a new `Price` row unless the most recent row for this
/// `(provider_id, model_id)` is younger than the 24 h suppression window.
/// Returns `None` when suppressed.
pub async fn save_price(
    pool: &PgPool,
    provider_id: Uuid,
    model_id: Uuid,
    input_per_m: f64,
    output_per_m: f64,
) -> Result<Option<Uuid>> {
    let latest: Option<(DateTime<Utc>,)> = sqlx::query_as(
        r#"
        select "timestamp"
        from prices
        where provider_id = $1 and model_id = $2
        order by "timestamp" desc
        limit 1
        "#,
    )
    .bind(provider_id)
    .bind(model_id)
    .fetch_optional(pool)
    .await
    .context("save_price latest-row lookup failed")?;

    if let Some((ts,)) = latest {
        let age_hours = Utc::now().signed_duration_since(ts).num_hours();
        if age_hours < PRICE_SUPPRESSION_WINDOW_HOURS {
            return Ok(None);
        }
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        insert into prices (id, provider_id, model_id, input_per_m, output_per_m, "timestamp")
        values ($1, $2, $3, $4, $5, now())
        "#,
    )
    .bind(id)
    .bind(provider_id)
    .bind(model_id)
    .bind(input_per_m)
    .bind(output_per_m)
    .execute(pool)
    .await
    .context("save_price insert failed")?;

    Ok(Some(id))
}

// ---------------------------------------------------------------------------
// Benchmark results / run errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewBenchmark {
    pub run_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub provider: String,
    pub model: String,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub reasoning_tokens: Option<i64>,
    pub total_latency_ms: f64,
    pub ttft_ms: Option<f64>,
    pub tps: Option<f64>,
    pub cost_usd: f64,
    pub status_code: Option<i32>,
    pub response_text: Option<String>,
    pub prompt: Option<String>,
}

/// Runs the Token Validator and response truncation, then writes one
/// `BenchmarkResult` row. Always returns a row id — a validator-forced
/// `success=false` is still a successful *persistence*.
pub async fn save_benchmark(pool: &PgPool, fields: NewBenchmark) -> Result<Uuid> {
    let validation = llmb_validator::validate_token_counts(
        fields.input_tokens,
        fields.output_tokens,
        fields.prompt.as_deref(),
        fields.response_text.as_deref(),
    );

    let fail_by_validation = llmb_validator::should_fail_benchmark(&validation);
    let success = !fail_by_validation;

    let error_message = fail_by_validation.then(|| {
        format!("Token validation failed: {}", validation.summary())
    });

    let model_name = llmb_validator::normalize_model_name(&fields.model);
    let response_text = fields.response_text.map(|text| {
        if success {
            llmb_validator::truncate_response_text(&text)
        } else {
            text
        }
    });

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        insert into benchmark_results (
            id, run_id, provider_id, model_id, provider, model,
            input_tokens, output_tokens, reasoning_tokens,
            total_latency_ms, ttft_ms, tps, cost_usd,
            status_code, success, error_message, response_text, created_at
        ) values (
            $1, $2, $3, $4, $5, $6,
            $7, $8, $9,
            $10, $11, $12, $13,
            $14, $15, $16, $17, now()
        )
        "#,
    )
    .bind(id)
    .bind(fields.run_id)
    .bind(fields.provider_id)
    .bind(fields.model_id)
    .bind(&fields.provider)
    .bind(&model_name)
    .bind(validation.input_tokens)
    .bind(validation.output_tokens)
    .bind(fields.reasoning_tokens)
    .bind(fields.total_latency_ms)
    .bind(fields.ttft_ms)
    .bind(fields.tps)
    .bind(fields.cost_usd)
    .bind(fields.status_code)
    .bind(success)
    .bind(&error_message)
    .bind(&response_text)
    .execute(pool)
    .await
    .context("save_benchmark insert failed")?;

    Ok(id)
}

#[derive(Debug, Clone)]
pub struct NewRunError {
    pub run_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub provider: String,
    pub model: String,
    pub error_kind: ErrorKind,
    pub error_message: String,
    pub status_code: Option<i32>,
}

pub async fn save_run_error(pool: &PgPool, fields: NewRunError) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        insert into run_errors (
            id, run_id, provider_id, model_id, provider, model,
            error_type, error_message, status_code, "timestamp"
        ) values (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, now()
        )
        "#,
    )
    .bind(id)
    .bind(fields.run_id)
    .bind(fields.provider_id)
    .bind(fields.model_id)
    .bind(&fields.provider)
    .bind(&fields.model)
    .bind(fields.error_kind.as_str())
    .bind(&fields.error_message)
    .bind(fields.status_code)
    .execute(pool)
    .await
    .context("save_run_error insert failed")?;
    Ok(id)
}

fn benchmark_result_from_row(row: sqlx::postgres::PgRow) -> Result<BenchmarkResult> {
    Ok(BenchmarkResult {
        id: row.try_get("id")?,
        run_id: row.try_get("run_id")?,
        provider_id: row.try_get("provider_id")?,
        model_id: row.try_get("model_id")?,
        provider: row.try_get("provider")?,
        model: row.try_get("model")?,
        input_tokens: row.try_get("input_tokens")?,
        output_tokens: row.try_get("output_tokens")?,
        reasoning_tokens: row.try_get("reasoning_tokens")?,
        total_latency_ms: row.try_get("total_latency_ms")?,
        ttft_ms: row.try_get("ttft_ms")?,
        tps: row.try_get("tps")?,
        cost_usd: row.try_get("cost_usd")?,
        status_code: row.try_get("status_code")?,
        success: row.try_get("success")?,
        error_message: row.try_get("error_message")?,
        response_text: row.try_get("response_text")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn fetch_benchmark_results_for_run(pool: &PgPool, run_id: Uuid) -> Result<Vec<BenchmarkResult>> {
    let rows = sqlx::query(
        r#"
        select id, run_id, provider_id, model_id, provider, model,
               input_tokens, output_tokens, reasoning_tokens,
               total_latency_ms, ttft_ms, tps, cost_usd,
               status_code, success, error_message, response_text, created_at
        from benchmark_results
        where run_id = $1
        order by created_at asc
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await
    .context("fetch_benchmark_results_for_run failed")?;

    rows.into_iter().map(benchmark_result_from_row).collect()
}

pub async fn fetch_run_errors_for_run(pool: &PgPool, run_id: Uuid) -> Result<Vec<RunError>> {
    let rows = sqlx::query(
        r#"
        select id, run_id, provider_id, model_id, provider, model,
               error_type, error_message, status_code, "timestamp"
        from run_errors
        where run_id = $1
        order by "timestamp" asc
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await
    .context("fetch_run_errors_for_run failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(RunError {
            id: row.try_get("id")?,
            run_id: row.try_get("run_id")?,
            provider_id: row.try_get("provider_id")?,
            model_id: row.try_get("model_id")?,
            provider: row.try_get("provider")?,
            model: row.try_get("model")?,
            error_type: row.try_get("error_type")?,
            error_message: row.try_get("error_message")?,
            status_code: row.try_get("status_code")?,
            timestamp: row.try_get("timestamp")?,
        });
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// Idempotent per `(run_id, provider_key, model_name)`. Returns `true` on
/// success regardless of how many of the pairs were already enqueued.
pub async fn enqueue_benchmarks(pool: &PgPool, run_id: Uuid, pairs: &[(String, String)]) -> Result<bool> {
    for (provider_key, model_name) in pairs {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            insert into queue_items (id, run_id, provider_key, model_name, status, attempts, max_attempts, created_at)
            values ($1, $2, $3, $4, 'pending', 0, $5, now())
            on conflict (run_id, provider_key, model_name) do nothing
            "#,
        )
        .bind(id)
        .bind(run_id)
        .bind(provider_key)
        .bind(model_name)
        .bind(llmb_schemas::DEFAULT_MAX_ATTEMPTS)
        .execute(pool)
        .await
        .context("enqueue_benchmarks insert failed")?;
    }
    Ok(true)
}

fn queue_item_from_row(row: sqlx::postgres::PgRow) -> Result<QueueItem> {
    let status_str: String = row.try_get("status")?;
    Ok(QueueItem {
        id: row.try_get("id")?,
        run_id: row.try_get("run_id")?,
        provider_key: row.try_get("provider_key")?,
        model_name: row.try_get("model_name")?,
        status: QueueStatus::parse(&status_str)
            .with_context(|| format!("invalid queue status in row: {status_str}"))?,
        attempts: row.try_get("attempts")?,
        max_attempts: row.try_get("max_attempts")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        error_message: row.try_get("error_message")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Fetches up to `limit` pending items, oldest first. Does not claim them —
/// callers must call `mark_queue_item_processing` per item, whose
/// conditional `WHERE status = 'pending'` update is what makes the claim
/// race-safe across concurrent batch workers.
pub async fn get_pending_queue_items(pool: &PgPool, limit: i64) -> Result<Vec<QueueItem>> {
    let rows = sqlx::query(
        r#"
        select id, run_id, provider_key, model_name, status, attempts, max_attempts,
               started_at, completed_at, error_message, created_at
        from queue_items
        where status = 'pending'
        order by created_at asc
        limit $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("get_pending_queue_items failed")?;

    rows.into_iter().map(queue_item_from_row).collect()
}

/// Claims one pending item. Returns `true` only if this call performed the
/// `pending -> processing` transition — a concurrent caller that lost the
/// race gets `false` and must not touch the item further.
pub async fn mark_queue_item_processing(pool: &PgPool, id: Uuid) -> Result<bool> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        update queue_items
           set status = 'processing',
               started_at = now(),
               attempts = attempts + 1
         where id = $1
           and status = 'pending'
        returning id
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("mark_queue_item_processing failed")?;
    Ok(row.is_some())
}

pub async fn mark_queue_item_completed(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        update queue_items
           set status = 'completed',
               completed_at = now()
         where id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await
    .context("mark_queue_item_completed failed")?;
    Ok(result.rows_affected() > 0)
}

/// Returns the item to `pending` if attempts remain, otherwise moves it to
/// terminal `failed`. Either way the error message is recorded.
pub async fn mark_queue_item_failed(pool: &PgPool, id: Uuid, error_message: &str) -> Result<bool> {
    let row = sqlx::query("select attempts, max_attempts from queue_items where id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("mark_queue_item_failed lookup failed")?;

    let Some(row) = row else { return Ok(false) };
    let attempts: i32 = row.try_get("attempts")?;
    let max_attempts: i32 = row.try_get("max_attempts")?;

    let result = if attempts < max_attempts {
        sqlx::query(
            r#"
            update queue_items
               set status = 'pending',
                   error_message = $2
             where id = $1
            "#,
        )
        .bind(id)
        .bind(error_message)
        .execute(pool)
        .await
        .context("mark_queue_item_failed requeue failed")?
    } else {
        sqlx::query(
            r#"
            update queue_items
               set status = 'failed',
                   error_message = $2,
                   completed_at = now()
             where id = $1
            "#,
        )
        .bind(id)
        .bind(error_message)
        .execute(pool)
        .await
        .context("mark_queue_item_failed terminal failed")?
    };

    Ok(result.rows_affected() > 0)
}

pub async fn get_queue_stats(pool: &PgPool, run_id: Uuid) -> Result<QueueStats> {
    let rows = sqlx::query(
        r#"
        select status, count(*)::bigint as n
        from queue_items
        where run_id = $1
        group by status
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await
    .context("get_queue_stats failed")?;

    let mut stats = QueueStats::default();
    for row in rows {
        let status: String = row.try_get("status")?;
        let n: i64 = row.try_get("n")?;
        match status.as_str() {
            "pending" => stats.pending = n,
            "processing" => stats.processing = n,
            "completed" => stats.completed = n,
            "failed" => stats.failed = n,
            _ => {}
        }
    }
    Ok(stats)
}

pub async fn get_recent_spending(pool: &PgPool, hours: i64) -> Result<f64> {
    let (total,): (Option<f64>,) = sqlx::query_as(
        r#"
        select sum(cost_usd)
        from benchmark_results
        where created_at >= now() - ($1 || ' hours')::interval
        "#,
    )
    .bind(hours.to_string())
    .fetch_one(pool)
    .await
    .context("get_recent_spending failed")?;

    Ok(total.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_item_from_row_rejects_unknown_status() {
        // Exercised indirectly via QueueStatus::parse; kept here as a
        // documentation test of the expected failure mode.
        assert!(QueueStatus::parse("bogus").is_none());
    }
}
