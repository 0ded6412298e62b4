//! Read-through pricing lookup.
//!
//! No in-memory cache is mandated by the contract: every call goes through
//! to `llmb-db::get_model_pricing`, which already does the "latest row"
//! query. This crate's job is the fallback: when no `Price` row exists yet
//! (a model just discovered, before the scraper has priced it), return a
//! provider-specific default instead of failing the call.

use anyhow::Result;
use llmb_schemas::PriceRate;
use sqlx::PgPool;

/// Conservative placeholder rates ($ / 1M tokens) used only until the
/// external scraper collaborator (out of scope) writes a real `Price` row
/// for this provider. Not a source of truth — `get_model_pricing` always
/// wins when a row exists.
fn default_rate_for_provider(provider_key: &str) -> PriceRate {
    match provider_key {
        "openai" => PriceRate { input_per_m: 5.0, output_per_m: 15.0 },
        "anthropic" => PriceRate { input_per_m: 3.0, output_per_m: 15.0 },
        "google" => PriceRate { input_per_m: 1.25, output_per_m: 5.0 },
        "groq" => PriceRate { input_per_m: 0.59, output_per_m: 0.79 },
        "together" => PriceRate { input_per_m: 0.88, output_per_m: 0.88 },
        "openrouter" => PriceRate { input_per_m: 1.0, output_per_m: 1.0 },
        "deepseek" => PriceRate { input_per_m: 0.27, output_per_m: 1.10 },
        "cerebras" => PriceRate { input_per_m: 0.60, output_per_m: 0.60 },
        "mistral" => PriceRate { input_per_m: 2.0, output_per_m: 6.0 },
        "fireworks" => PriceRate { input_per_m: 0.90, output_per_m: 0.90 },
        "sambanova" => PriceRate { input_per_m: 0.60, output_per_m: 1.20 },
        _ => PriceRate { input_per_m: 1.0, output_per_m: 1.0 },
    }
}

/// Returns the latest persisted rate for `(provider_name, model_name)`, or
/// a provider default if no `Price` row has been written yet.
pub async fn get_pricing(pool: &PgPool, provider_key: &str, provider_name: &str, model_name: &str) -> Result<PriceRate> {
    match llmb_db::get_model_pricing(pool, provider_name, model_name).await? {
        Some(rate) => Ok(rate),
        None => {
            tracing::debug!(provider_name, model_name, "no price row yet, using provider default");
            Ok(default_rate_for_provider(provider_key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_provider_has_nonzero_default_rate() {
        let rate = default_rate_for_provider("openai");
        assert!(rate.input_per_m > 0.0);
        assert!(rate.output_per_m > 0.0);
    }

    #[test]
    fn unknown_provider_falls_back_to_generic_default() {
        let rate = default_rate_for_provider("made-up-provider");
        assert_eq!(rate.input_per_m, 1.0);
        assert_eq!(rate.output_per_m, 1.0);
    }
}
