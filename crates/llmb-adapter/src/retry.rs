//! Adapter-local bounded retry on 5xx/transient-network failures only.
//! Wraps any `ProviderAdapter` so every concrete adapter gets the same
//! narrow retry for free.

use async_trait::async_trait;
use llmb_config::RetryPolicy;
use llmb_schemas::{Envelope, ErrorKind, PriceRate};

use crate::classify::is_adapter_retryable;
use crate::prompt::ModelClass;
use crate::registry::ProviderAdapter;

pub struct RetryingAdapter<A> {
    inner: A,
    policy: RetryPolicy,
}

impl<A> RetryingAdapter<A> {
    pub fn new(inner: A, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<A: ProviderAdapter> ProviderAdapter for RetryingAdapter<A> {
    async fn call(&self, benchmark_prompt: &str, model: &str, model_class: ModelClass, rate: PriceRate) -> Envelope {
        let mut last = self.inner.call(benchmark_prompt, model, model_class, rate).await;

        let mut try_index = 0;
        while let Envelope::Err { kind, status_code, message } = &last {
            if *kind == ErrorKind::ConfigError {
                break;
            }
            let status = (*status_code).map(|s| s as u16);
            if !is_adapter_retryable(status, message) || try_index + 1 >= self.policy.adapter_max_tries {
                break;
            }
            tokio::time::sleep(self.policy.backoff_for_try(try_index + 1)).await;
            try_index += 1;
            last = self.inner.call(benchmark_prompt, model, model_class, rate).await;
        }

        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmb_schemas::CallMetrics;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct FlakyThenOk {
        attempts: Arc<AtomicU32>,
        fail_times: u32,
    }

    #[async_trait]
    impl ProviderAdapter for FlakyThenOk {
        async fn call(&self, _prompt: &str, _model: &str, _class: ModelClass, _rate: PriceRate) -> Envelope {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                return Envelope::Err {
                    kind: ErrorKind::UnknownError,
                    status_code: Some(503),
                    message: "upstream 503".to_string(),
                };
            }
            Envelope::Ok {
                metrics: CallMetrics {
                    input_tokens: 10,
                    output_tokens: 10,
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

    #[tokio::test]
    async fn succeeds_after_transient_5xx_without_exposing_the_failure() {
        let attempts = Arc::new(AtomicU32::new(0));
        let adapter = RetryingAdapter::new(
            FlakyThenOk { attempts: attempts.clone(), fail_times: 2 },
            RetryPolicy::default(),
        );
        let rate = PriceRate { input_per_m: 1.0, output_per_m: 1.0 };
        let result = adapter.call("prompt", "model", ModelClass::Standard, rate).await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_tries_and_surfaces_the_error() {
        let attempts = Arc::new(AtomicU32::new(0));
        let adapter = RetryingAdapter::new(
            FlakyThenOk { attempts: attempts.clone(), fail_times: 100 },
            RetryPolicy::default(),
        );
        let rate = PriceRate { input_per_m: 1.0, output_per_m: 1.0 };
        let result = adapter.call("prompt", "model", ModelClass::Standard, rate).await;
        assert!(!result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn config_error_is_never_retried() {
        struct AlwaysConfigError;
        #[async_trait]
        impl ProviderAdapter for AlwaysConfigError {
            async fn call(&self, _p: &str, _m: &str, _c: ModelClass, _r: PriceRate) -> Envelope {
                Envelope::Err { kind: ErrorKind::ConfigError, status_code: None, message: "no key".to_string() }
            }
        }
        let adapter = RetryingAdapter::new(AlwaysConfigError, RetryPolicy::default());
        let rate = PriceRate { input_per_m: 1.0, output_per_m: 1.0 };
        let result = adapter.call("prompt", "model", ModelClass::Standard, rate).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::ConfigError));
    }
}
