//! Run Manager: a thin lifecycle wrapper so future extension — per-run
//! config, aggregate stats on finish — is a single-seam change.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RunManager;

impl RunManager {
    pub async fn start(pool: &PgPool, run_name: &str, triggered_by: &str) -> Result<Uuid> {
        llmb_db::create_run(pool, run_name, triggered_by).await
    }

    pub async fn end(pool: &PgPool, run_id: Uuid) -> Result<bool> {
        llmb_db::finish_run(pool, run_id).await
    }
}
