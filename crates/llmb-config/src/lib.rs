//! Environment-driven configuration for the benchmark queue engine.
//!
//! `.env.local` is loaded if present, silently ignored otherwise —
//! production injects real env vars directly.

use std::time::Duration;

use anyhow::{Context, Result};

/// Loads `.env.local` from the current directory if present. Call once at
/// the top of every binary's `main`, before anything reads an env var.
pub fn bootstrap_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    Supabase,
    Local,
}

impl DbType {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "supabase" => Some(DbType::Supabase),
            "local" => Some(DbType::Local),
            _ => None,
        }
    }
}

/// The shared adapter-local / queue-level retry policy — one value backs
/// both the adapter's 5xx retry and the queue's attempt ceiling.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Adapter-local retry attempts for a single 5xx-triggering call.
    pub adapter_max_tries: u32,
    /// Base backoff; attempt N waits `base * 2^(N-1)`.
    pub adapter_backoff_base: Duration,
    /// Queue-level attempts before a QueueItem is marked permanently failed.
    pub queue_max_attempts: i32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            adapter_max_tries: 3,
            adapter_backoff_base: Duration::from_secs(1),
            queue_max_attempts: llmb_schemas::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `try_index` (1-based): 1s, 2s, 4s, ...
    pub fn backoff_for_try(&self, try_index: u32) -> Duration {
        self.adapter_backoff_base * 2u32.saturating_pow(try_index.saturating_sub(1))
    }
}

/// Per-provider API key lookup. Keys are read lazily by the adapter that
/// needs them; this struct documents the full set the core supports.
#[derive(Debug, Clone)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub google: Option<String>,
    pub groq: Option<String>,
    pub together: Option<String>,
    pub openrouter: Option<String>,
    pub deepseek: Option<String>,
    pub cerebras: Option<String>,
    pub mistral: Option<String>,
    pub fireworks: Option<String>,
    pub sambanova: Option<String>,
}

impl ProviderKeys {
    pub fn from_env() -> Self {
        ProviderKeys {
            openai: env_opt("OPENAI_API_KEY"),
            anthropic: env_opt("ANTHROPIC_API_KEY"),
            google: env_opt("GOOGLE_API_KEY"),
            groq: env_opt("GROQ_API_KEY"),
            together: env_opt("TOGETHER_API_KEY"),
            openrouter: env_opt("OPENROUTER_API_KEY"),
            deepseek: env_opt("DEEPSEEK_API_KEY"),
            cerebras: env_opt("CEREBRAS_API_KEY"),
            mistral: env_opt("MISTRAL_API_KEY"),
            fireworks: env_opt("FIREWORKS_API_KEY"),
            sambanova: env_opt("SAMBANOVA_API_KEY"),
        }
    }

    /// Look up the key for a provider by its registry key (e.g. `"openai"`).
    pub fn get(&self, provider_key: &str) -> Option<&str> {
        match provider_key {
            "openai" => self.openai.as_deref(),
            "anthropic" => self.anthropic.as_deref(),
            "google" => self.google.as_deref(),
            "groq" => self.groq.as_deref(),
            "together" => self.together.as_deref(),
            "openrouter" => self.openrouter.as_deref(),
            "deepseek" => self.deepseek.as_deref(),
            "cerebras" => self.cerebras.as_deref(),
            "mistral" => self.mistral.as_deref(),
            "fireworks" => self.fireworks.as_deref(),
            "sambanova" => self.sambanova.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub database_url: String,
    pub db_type: DbType,
    pub budget_cap_usd: f64,
    pub disable_scheduler: bool,
    pub retry_policy: RetryPolicy,
    pub provider_keys: ProviderKeys,
}

impl CoreConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let db_type = match std::env::var("DB_TYPE") {
            Ok(v) => DbType::parse(&v)
                .with_context(|| format!("invalid DB_TYPE {v:?}, expected \"supabase\" or \"local\""))?,
            Err(_) => DbType::Supabase,
        };

        let budget_cap_usd = match std::env::var("BENCHMARK_BUDGET_CAP") {
            Ok(v) => v
                .parse::<f64>()
                .with_context(|| format!("invalid BENCHMARK_BUDGET_CAP {v:?}"))?,
            Err(_) => 15.0,
        };

        let disable_scheduler = env_opt("DISABLE_SCHEDULER")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(CoreConfig {
            database_url,
            db_type,
            budget_cap_usd,
            disable_scheduler,
            retry_policy: RetryPolicy::default(),
            provider_keys: ProviderKeys::from_env(),
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_backoff_doubles_per_try() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff_for_try(1), Duration::from_secs(1));
        assert_eq!(p.backoff_for_try(2), Duration::from_secs(2));
        assert_eq!(p.backoff_for_try(3), Duration::from_secs(4));
    }

    #[test]
    fn db_type_parse_rejects_unknown() {
        assert!(DbType::parse("bogus").is_none());
        assert_eq!(DbType::parse("local"), Some(DbType::Local));
    }

    #[test]
    fn provider_keys_get_is_none_for_unknown_key() {
        let keys = ProviderKeys {
            openai: Some("sk-test".into()),
            anthropic: None,
            google: None,
            groq: None,
            together: None,
            openrouter: None,
            deepseek: None,
            cerebras: None,
            mistral: None,
            fireworks: None,
            sambanova: None,
        };
        assert_eq!(keys.get("openai"), Some("sk-test"));
        assert_eq!(keys.get("nonexistent"), None);
    }
}
