//! llmb CLI: operator commands around the benchmark queue engine.
//!
//! Thin wrapper over `llmb-db` / `llmb-queue` / `llmb-adapter` — no business
//! logic lives here, only argument parsing and printing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "llmb")]
#[command(about = "LLM Benchmark Queue CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Benchmark queue lifecycle commands
    Queue {
        #[command(subcommand)]
        cmd: QueueCmd,
    },

    /// Model catalog commands
    Model {
        #[command(subcommand)]
        cmd: ModelCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    /// Check connectivity and schema presence.
    Status,
    /// Apply pending migrations.
    Migrate,
    /// Re-run model-name normalization over every stored model row.
    RenormalizeModels,
}

#[derive(Subcommand)]
enum QueueCmd {
    /// Start a new Run and populate the queue from the active model catalog.
    Init {
        #[arg(long, default_value = "manual")]
        run_name: String,
        #[arg(long, default_value = "cli")]
        triggered_by: String,
    },
    /// Process one batch of pending items.
    Process {
        #[arg(long, default_value_t = llmb_queue::DEFAULT_BATCH_SIZE)]
        batch_size: i64,
    },
    /// Print queue stats for a Run.
    Status {
        #[arg(long)]
        run_id: Uuid,
    },
}

#[derive(Subcommand)]
enum ModelCmd {
    /// List every known model across all providers.
    List,
    /// Activate a subset of a provider's models (deactivates the rest).
    Activate {
        #[arg(long)]
        provider: String,
        #[arg(long = "model", required = true)]
        models: Vec<String>,
    },
    /// Write a pricing row for a (provider, model) pair.
    SetPrice {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        input_per_m: f64,
        #[arg(long)]
        output_per_m: f64,
    },
    /// Flag a model as a reasoning model, driving the adapter's longer timeout.
    SetReasoning {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        is_reasoning: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    llmb_config::bootstrap_dotenv();
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = llmb_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = llmb_db::status(&pool).await?;
                    println!("db_ok={} has_runs_table={}", s.ok, s.has_runs_table);
                }
                DbCmd::Migrate => {
                    llmb_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
                DbCmd::RenormalizeModels => {
                    let mut renamed = 0usize;
                    let mut skipped = 0usize;
                    for model in llmb_db::list_all_models(&pool).await? {
                        let normalized = llmb_queue::normalize_model_name(&model.name);
                        if normalized == model.name {
                            continue;
                        }
                        if llmb_db::rename_model(&pool, model.id, &normalized).await? {
                            println!("{} -> {}", model.name, normalized);
                            renamed += 1;
                        } else {
                            eprintln!("skip (name collision): {} -> {}", model.name, normalized);
                            skipped += 1;
                        }
                    }
                    println!("renamed={renamed} skipped={skipped}");
                }
            }
        }

        Commands::Queue { cmd } => {
            let pool = llmb_db::connect_from_env().await?;
            match cmd {
                QueueCmd::Init { run_name, triggered_by } => {
                    let run_id = llmb_queue::init_benchmark_queue(&pool, &run_name, &triggered_by).await?;
                    println!("run_id={run_id}");
                }
                QueueCmd::Process { batch_size } => {
                    let config = llmb_config::CoreConfig::from_env().context("failed to load configuration")?;
                    let registry = llmb_adapter::build_default_registry(&config.provider_keys, config.retry_policy);
                    let outcome = llmb_queue::run_benchmark_batch(&pool, &registry, config.budget_cap_usd, batch_size).await?;
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
                QueueCmd::Status { run_id } => {
                    let stats = llmb_queue::get_run_queue_stats(&pool, run_id).await?;
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
            }
        }

        Commands::Model { cmd } => {
            let pool = llmb_db::connect_from_env().await?;
            match cmd {
                ModelCmd::List => {
                    for model in llmb_db::list_all_models(&pool).await? {
                        println!(
                            "{}\t{}\tactive={}\treasoning={}",
                            model.provider_id, model.name, model.active, model.is_reasoning
                        );
                    }
                }
                ModelCmd::Activate { provider, models } => {
                    let provider_id = llmb_db::get_or_create_provider(&pool, &provider, None, None).await?;
                    llmb_db::set_models_active(&pool, provider_id, &models).await?;
                    println!("activated {} model(s) for provider {}", models.len(), provider);
                }
                ModelCmd::SetPrice { provider, model, input_per_m, output_per_m } => {
                    let provider_id = llmb_db::get_or_create_provider(&pool, &provider, None, None).await?;
                    let model_id = llmb_db::get_or_create_model(&pool, provider_id, &model, None).await?;
                    llmb_db::save_price(&pool, provider_id, model_id, input_per_m, output_per_m).await?;
                    println!("price recorded for {provider}/{model}");
                }
                ModelCmd::SetReasoning { provider, model, is_reasoning } => {
                    let provider_id = llmb_db::get_or_create_provider(&pool, &provider, None, None).await?;
                    let model_id = llmb_db::get_or_create_model(&pool, provider_id, &model, None).await?;
                    llmb_db::set_model_reasoning_flag(&pool, model_id, is_reasoning).await?;
                    println!("{provider}/{model} reasoning={is_reasoning}");
                }
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
