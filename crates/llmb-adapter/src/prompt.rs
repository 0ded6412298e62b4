//! Canonical request shape shared by every adapter, so measurements compare
//! providers rather than prompts.

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Your task is to summarize the provided text into exactly three concise bullet points.";

/// A fresh UUID per call defeats any upstream response caching/deduplication.
pub fn build_user_message(benchmark_prompt: &str) -> String {
    format!("REQUEST ID: {}\n\n{benchmark_prompt}", uuid::Uuid::new_v4())
}

pub const DEFAULT_TEMPERATURE: f64 = 0.75;
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelClass {
    Standard,
    Reasoning,
}

impl ModelClass {
    /// 60s for standard models, 120s for reasoning models whose latency is
    /// dominated by internal planning before any token is emitted.
    pub fn timeout(&self) -> std::time::Duration {
        match self {
            ModelClass::Standard => std::time::Duration::from_secs(60),
            ModelClass::Reasoning => std::time::Duration::from_secs(120),
        }
    }
}
