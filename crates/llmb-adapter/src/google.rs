//! Google Gemini streaming adapter (`streamGenerateContent?alt=sse`).
//! Opaque-event style: `candidates[0].content.parts[0].text` plus a final
//! `usageMetadata` block, rather than OpenAI's `choices[].delta`.

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

pub struct GoogleAdapter {
    base_url: &'static str,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GoogleAdapter {
    pub fn new(base_url: &'static str, api_key: Option<String>) -> Self {
        Self { base_url, api_key, client: reqwest::Client::new() }
    }
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: i64,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: i64,
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    async fn call(&self, benchmark_prompt: &str, model: &str, model_class: ModelClass, rate: PriceRate) -> Envelope {
        let Some(api_key) = self.api_key.as_ref() else {
            return Envelope::Err {
                kind: ErrorKind::ConfigError,
                status_code: None,
                message: "missing API key for provider 'google'".to_string(),
            };
        };

        let url = format!(
            "{base}/models/{model}:streamGenerateContent?alt=sse&key={api_key}",
            base = self.base_url
        );

        let body = json!({
            "system_instruction": {"parts": [{"text": SYSTEM_PROMPT}]},
            "contents": [
                {"role": "user", "parts": [{"text": build_user_message(benchmark_prompt)}]},
            ],
            "generationConfig": {
                "temperature": DEFAULT_TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        });

        let t_start = Instant::now();
        let response = match self.client.post(&url).json(&body).timeout(model_class.timeout()).send().await {
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
        let mut usage: Option<UsageMetadata> = None;
        let mut stream = response.bytes_stream().eventsource();

        while let Some(event) = futures_util::StreamExt::next(&mut stream).await {
            let event = match event {
                Ok(event) => event,
                Err(_) => continue,
            };
            let chunk: GenerateChunk = match serde_json::from_str(&event.data) {
                Ok(chunk) => chunk,
                Err(_) => continue,
            };
            if let Some(text) = chunk
                .candidates
                .first()
                .and_then(|c| c.content.parts.first())
                .and_then(|p| p.text.as_ref())
                .filter(|t| !t.is_empty())
            {
                if t_first.is_none() {
                    t_first = Some(Instant::now());
                }
                buffer.push_str(text);
            }
            if chunk.usage_metadata.is_some() {
                usage = chunk.usage_metadata;
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

        let (input_tokens, output_tokens) = match usage {
            Some(u) => (u.prompt_token_count, u.candidates_token_count),
            None => (
                llmb_validator::estimate_tokens(benchmark_prompt),
                llmb_validator::estimate_tokens(&buffer),
            ),
        };

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
