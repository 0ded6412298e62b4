//! Smoke tests for the `llmb` CLI binary's DB and queue subcommands.
//!
//! DB-backed, skipped if `DATABASE_URL` is not set.

use predicates::prelude::*;

#[tokio::test]
async fn db_status_and_migrate_succeed() -> anyhow::Result<()> {
    let Ok(url) = std::env::var(llmb_db::ENV_DB_URL) else {
        eprintln!("SKIP: DATABASE_URL not set");
        return Ok(());
    };

    let mut migrate = assert_cmd::Command::cargo_bin("llmb")?;
    migrate.env(llmb_db::ENV_DB_URL, &url).args(["db", "migrate"]);
    migrate.assert().success().stdout(predicate::str::contains("migrations_applied=true"));

    let mut status = assert_cmd::Command::cargo_bin("llmb")?;
    status.env(llmb_db::ENV_DB_URL, &url).args(["db", "status"]);
    status.assert().success().stdout(predicate::str::contains("db_ok=true"));

    Ok(())
}

#[tokio::test]
async fn queue_init_then_status_reports_a_fresh_run() -> anyhow::Result<()> {
    let Ok(url) = std::env::var(llmb_db::ENV_DB_URL) else {
        eprintln!("SKIP: DATABASE_URL not set");
        return Ok(());
    };

    let mut init = assert_cmd::Command::cargo_bin("llmb")?;
    init.env(llmb_db::ENV_DB_URL, &url).args(["queue", "init", "--run-name", "cli-smoke-test"]);
    let output = init.output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let run_id = stdout.trim().strip_prefix("run_id=").expect("run_id line expected").to_string();

    let mut status = assert_cmd::Command::cargo_bin("llmb")?;
    status.env(llmb_db::ENV_DB_URL, &url).args(["queue", "status", "--run-id", &run_id]);
    status.assert().success().stdout(predicate::str::contains("\"pending\""));

    Ok(())
}

#[tokio::test]
async fn model_set_reasoning_marks_the_catalog_row() -> anyhow::Result<()> {
    let Ok(url) = std::env::var(llmb_db::ENV_DB_URL) else {
        eprintln!("SKIP: DATABASE_URL not set");
        return Ok(());
    };

    let mut set_reasoning = assert_cmd::Command::cargo_bin("llmb")?;
    set_reasoning.env(llmb_db::ENV_DB_URL, &url).args([
        "model",
        "set-reasoning",
        "--provider",
        "cli-smoke-reasoning",
        "--model",
        "o1-preview",
        "--is-reasoning",
        "true",
    ]);
    set_reasoning.assert().success().stdout(predicate::str::contains("reasoning=true"));

    let mut list = assert_cmd::Command::cargo_bin("llmb")?;
    list.env(llmb_db::ENV_DB_URL, &url).args(["model", "list"]);
    list.assert().success().stdout(predicate::str::contains("o1-preview\tactive=false\treasoning=true"));

    Ok(())
}
