//! Provider Adapters: execute one benchmark call to one (provider, model)
//! and return a standardized [`Envelope`](llmb_schemas::Envelope).
//!
//! Grounded on `codex-client::transport`'s `HttpTransport` shape for the
//! request/response plumbing, generalized to streaming chat completions
//! across eleven providers split into three wire-format families.

mod anthropic;
mod classify;
mod cost;
mod google;
mod openai_compatible;
mod prompt;
mod registry;
mod retry;
mod timing;

pub use prompt::{ModelClass, SYSTEM_PROMPT};
pub use registry::{AdapterRegistry, ProviderAdapter};
pub use retry::RetryingAdapter;

use std::sync::Arc;

use llmb_config::{ProviderKeys, RetryPolicy};

use anthropic::AnthropicAdapter;
use google::GoogleAdapter;
use openai_compatible::{OpenAiCompatibleAdapter, OpenAiCompatibleConfig};

/// Builds the full, static registry of every provider the core knows about,
/// populated once at process start from a static table. Each entry is
/// wrapped in [`RetryingAdapter`] so the narrow 5xx-only retry applies
/// uniformly without every concrete adapter re-implementing it.
pub fn build_default_registry(keys: &ProviderKeys, retry_policy: RetryPolicy) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();

    let openai_compatible = [
        ("openai", "https://api.openai.com/v1/chat/completions", keys.get("openai")),
        ("groq", "https://api.groq.com/openai/v1/chat/completions", keys.get("groq")),
        ("together", "https://api.together.xyz/v1/chat/completions", keys.get("together")),
        ("openrouter", "https://openrouter.ai/api/v1/chat/completions", keys.get("openrouter")),
        ("deepseek", "https://api.deepseek.com/v1/chat/completions", keys.get("deepseek")),
        ("cerebras", "https://api.cerebras.ai/v1/chat/completions", keys.get("cerebras")),
        ("fireworks", "https://api.fireworks.ai/inference/v1/chat/completions", keys.get("fireworks")),
        ("sambanova", "https://api.sambanova.ai/v1/chat/completions", keys.get("sambanova")),
        ("mistral", "https://api.mistral.ai/v1/chat/completions", keys.get("mistral")),
    ];

    for (provider_key, base_url, api_key) in openai_compatible {
        let adapter = OpenAiCompatibleAdapter::new(OpenAiCompatibleConfig {
            provider_key,
            base_url,
            api_key: api_key.map(str::to_string),
            auth_header: "Authorization",
        });
        registry.register(provider_key, Arc::new(RetryingAdapter::new(adapter, retry_policy)));
    }

    registry.register(
        "anthropic",
        Arc::new(RetryingAdapter::new(
            AnthropicAdapter::new("https://api.anthropic.com/v1/messages", keys.get("anthropic").map(str::to_string)),
            retry_policy,
        )),
    );

    registry.register(
        "google",
        Arc::new(RetryingAdapter::new(
            GoogleAdapter::new(
                "https://generativelanguage.googleapis.com/v1beta",
                keys.get("google").map(str::to_string),
            ),
            retry_policy,
        )),
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_every_spec_provider() {
        let keys = ProviderKeys::from_env();
        let registry = build_default_registry(&keys, RetryPolicy::default());
        let expected = [
            "openai", "anthropic", "google", "groq", "together", "openrouter",
            "deepseek", "cerebras", "mistral", "fireworks", "sambanova",
        ];
        for key in expected {
            assert!(registry.get(key).is_some(), "missing adapter for {key}");
        }
    }
}
