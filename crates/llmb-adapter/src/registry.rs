use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use llmb_schemas::{Envelope, PriceRate};

use crate::prompt::ModelClass;

/// One provider's implementation of "execute one benchmark call, return a
/// standardized envelope". `rate` is injected by the caller — the adapter
/// computes cost but never talks to the pricing store directly.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn call(&self, benchmark_prompt: &str, model: &str, model_class: ModelClass, rate: PriceRate) -> Envelope;
}

/// A static mapping from `provider_key` to adapter, populated once at
/// process start. Unlike the original's runtime lookup-by-name, an
/// unregistered key here is a programming error the caller should treat as a
/// startup problem, not a per-item failure to retry.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self { adapters: HashMap::new() }
    }

    pub fn register(&mut self, provider_key: impl Into<String>, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(provider_key.into(), adapter);
    }

    pub fn get(&self, provider_key: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(provider_key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmb_schemas::CallMetrics;

    struct StubAdapter;

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        async fn call(&self, _prompt: &str, _model: &str, _class: ModelClass, _rate: PriceRate) -> Envelope {
            Envelope::Ok {
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
                response_text: Some("ok".to_string()),
            }
        }
    }

    #[test]
    fn unregistered_key_returns_none() {
        let registry = AdapterRegistry::new();
        assert!(registry.get("openai").is_none());
    }

    #[tokio::test]
    async fn registered_adapter_is_retrievable_and_callable() {
        let mut registry = AdapterRegistry::new();
        registry.register("openai", Arc::new(StubAdapter));
        let adapter = registry.get("openai").expect("must be registered");
        let rate = PriceRate { input_per_m: 1.0, output_per_m: 1.0 };
        let envelope = adapter.call("prompt", "gpt-4o", ModelClass::Standard, rate).await;
        assert!(envelope.is_ok());
    }
}
