//! One adapter shape shared by every OpenAI Chat Completions-compatible
//! provider: OpenAI itself, Groq, Together, OpenRouter, DeepSeek, Cerebras,
//! Fireworks, SambaNova, and Mistral. They differ only in base URL, auth
//! header, and API key env var — captured in `OpenAiCompatibleConfig`.

use std::time::Instant;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use llmb_schemas::{CallMetrics, Envelope, ErrorKind, PriceRate};
use serde::Deserialize;
use serde_json::json;

use crate::classify::classify;
use crate::cost::compute_cost;
use crate::prompt::{build_user_message, ModelClass, DEFAULT_TEMPERATURE, MAX_OUTPUT_TOKENS, SYSTEM_PROMPT};
use crate::registry::ProviderAdapter;
use crate::timing::{compute_timing, StreamTimestamps};

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    pub provider_key: &'static str,
    pub base_url: &'static str,
    pub api_key: Option<String>,
    /// Bearer by default; Cerebras/Fireworks/etc. all accept the same header.
    pub auth_header: &'static str,
}

pub struct OpenAiCompatibleAdapter {
    config: OpenAiCompatibleConfig,
    client: reqwest::Client,
}

impl OpenAiCompatibleAdapter {
    pub fn new(config: OpenAiCompatibleConfig) -> Self {
        Self { config, client: reqwest::Client::new() }
    }
}

#[derive(Deserialize)]
struct ChatChunk {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    delta: ChatDelta,
}

#[derive(Deserialize, Default)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: i64,
    completion_tokens: i64,
    #[serde(default)]
    completion_tokens_details: Option<CompletionTokensDetails>,
}

#[derive(Deserialize)]
struct CompletionTokensDetails {
    #[serde(default)]
    reasoning_tokens: Option<i64>,
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    async fn call(&self, benchmark_prompt: &str, model: &str, model_class: ModelClass, rate: PriceRate) -> Envelope {
        let Some(api_key) = self.config.api_key.as_ref() else {
            return Envelope::Err {
                kind: ErrorKind::ConfigError,
                status_code: None,
                message: format!("missing API key for provider '{}'", self.config.provider_key),
            };
        };

        let body = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_user_message(benchmark_prompt)},
            ],
            "temperature": DEFAULT_TEMPERATURE,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "stream": true,
            "stream_options": {"include_usage": true},
        });

        let t_start = Instant::now();
        let response = match self
            .client
            .post(self.config.base_url)
            .header(self.config.auth_header, format!("Bearer {api_key}"))
            .json(&body)
            .timeout(model_class.timeout())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                let (kind, status) = classify(err.status().map(|s| s.as_u16()), &err.to_string());
                return Envelope::Err { kind, status_code: status, message: err.to_string() };
            }
        };

        let status_code = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            let (kind, status) = classify(Some(status_code), &text);
            return Envelope::Err { kind, status_code: status, message: text };
        }

        let mut buffer = String::new();
        let mut t_first: Option<Instant> = None;
        let mut usage: Option<ChatUsage> = None;
        let mut stream = response.bytes_stream().eventsource();

        while let Some(event) = futures_util::StreamExt::next(&mut stream).await {
            let event = match event {
                Ok(event) => event,
                Err(_) => continue,
            };
            if event.data == "[DONE]" {
                break;
            }
            let chunk: ChatChunk = match serde_json::from_str(&event.data) {
                Ok(chunk) => chunk,
                Err(_) => continue,
            };
            if let Some(choice) = chunk.choices.first() {
                if let Some(content) = choice.delta.content.as_ref().filter(|c| !c.is_empty()) {
                    if t_first.is_none() {
                        t_first = Some(Instant::now());
                    }
                    buffer.push_str(content);
                }
            }
            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
        }
        let t_end = Instant::now();

        if buffer.is_empty() {
            return Envelope::Err {
                kind: ErrorKind::EmptyResponse,
                status_code: Some(200),
                message: "upstream returned HTTP 200 with an empty content stream".to_string(),
            };
        }

        let (input_tokens, output_tokens, reasoning_tokens) = match usage {
            Some(u) => (
                u.prompt_tokens,
                u.completion_tokens,
                u.completion_tokens_details.and_then(|d| d.reasoning_tokens),
            ),
            None => (
                llmb_validator::estimate_tokens(benchmark_prompt),
                llmb_validator::estimate_tokens(&buffer),
                None,
            ),
        };

        let timing = compute_timing(StreamTimestamps { t_start, t_first, t_end }, output_tokens);
        let cost_usd = compute_cost(input_tokens, output_tokens, rate);

        Envelope::Ok {
            metrics: CallMetrics {
                input_tokens,
                output_tokens,
                reasoning_tokens,
                total_latency_ms: timing.total_latency_ms,
                ttft_ms: timing.ttft_ms,
                tps: timing.tps,
            },
            cost_usd,
            status_code: Some(status_code as i32),
            response_text: Some(buffer),
        }
    }
}
