//! Anthropic Messages API streaming adapter. Distinct wire shape from the
//! OpenAI-compatible family: named SSE events rather than a single
//! `data:`-only stream, `system` as a top-level field, and usage split
//! across `message_start` (input) and `message_delta` (output).

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

const ANTHROPIC_API_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    base_url: &'static str,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl AnthropicAdapter {
    pub fn new(base_url: &'static str, api_key: Option<String>) -> Self {
        Self { base_url, api_key, client: reqwest::Client::new() }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum StreamEvent {
    #[serde(rename = "message_start")]
    MessageStart { message: MessageStartInner },
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: ContentDelta },
    #[serde(rename = "message_delta")]
    MessageDelta { usage: MessageDeltaUsage },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct MessageStartInner {
    usage: MessageStartUsage,
}

#[derive(Deserialize)]
struct MessageStartUsage {
    input_tokens: i64,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentDelta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct MessageDeltaUsage {
    output_tokens: i64,
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    async fn call(&self, benchmark_prompt: &str, model: &str, model_class: ModelClass, rate: PriceRate) -> Envelope {
        let Some(api_key) = self.api_key.as_ref() else {
            return Envelope::Err {
                kind: ErrorKind::ConfigError,
                status_code: None,
                message: "missing API key for provider 'anthropic'".to_string(),
            };
        };

        let body = json!({
            "model": model,
            "system": SYSTEM_PROMPT,
            "messages": [
                {"role": "user", "content": build_user_message(benchmark_prompt)},
            ],
            "temperature": DEFAULT_TEMPERATURE,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "stream": true,
        });

        let t_start = Instant::now();
        let response = match self
            .client
            .post(self.base_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
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
        let mut input_tokens: Option<i64> = None;
        let mut output_tokens: Option<i64> = None;
        let mut stream = response.bytes_stream().eventsource();

        while let Some(event) = futures_util::StreamExt::next(&mut stream).await {
            let event = match event {
                Ok(event) => event,
                Err(_) => continue,
            };
            let parsed: StreamEvent = match serde_json::from_str(&event.data) {
                Ok(parsed) => parsed,
                Err(_) => continue,
            };
            match parsed {
                StreamEvent::MessageStart { message } => {
                    input_tokens = Some(message.usage.input_tokens);
                }
                StreamEvent::ContentBlockDelta { delta: ContentDelta::TextDelta { text } } => {
                    if !text.is_empty() {
                        if t_first.is_none() {
                            t_first = Some(Instant::now());
                        }
                        buffer.push_str(&text);
                    }
                }
                StreamEvent::MessageDelta { usage } => {
                    output_tokens = Some(usage.output_tokens);
                }
                _ => {}
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

        let input_tokens = input_tokens.unwrap_or_else(|| llmb_validator::estimate_tokens(benchmark_prompt));
        let output_tokens = output_tokens.unwrap_or_else(|| llmb_validator::estimate_tokens(&buffer));

        let timing = compute_timing(StreamTimestamps { t_start, t_first, t_end }, output_tokens);
        let cost_usd = compute_cost(input_tokens, output_tokens, rate);

        Envelope::Ok {
            metrics: CallMetrics {
                input_tokens,
                output_tokens,
                reasoning_tokens: None,
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
