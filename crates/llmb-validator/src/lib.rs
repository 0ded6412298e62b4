//! Token-count validation and response-text truncation.
//!
//! Pure functions, no I/O — the validation core stays deterministic and free
//! of database/network concerns. Invoked by `llmb-db::save_benchmark` before
//! a Result row is written, so the failure policy applies exactly once,
//! atomically with persistence.

mod normalize;

pub use normalize::normalize_model_name;

const MIN_INPUT_TOKENS: i64 = 10;
const RESPONSE_TRUNCATE_CHARS: usize = 100;

/// Outcome of `validate_token_counts`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub input_tokens_estimated: bool,
    pub output_tokens_estimated: bool,
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

impl ValidationOutcome {
    /// Human-readable line for logs/CLI — mirrors the original
    /// `get_validation_summary`.
    pub fn summary(&self) -> String {
        if self.is_valid {
            return "Token counts valid".to_string();
        }

        let mut parts = Vec::new();
        parts.push(if self.input_tokens_estimated {
            format!("Input: {} (estimated)", self.input_tokens)
        } else {
            format!("Input: {}", self.input_tokens)
        });
        parts.push(if self.output_tokens_estimated {
            format!("Output: {} (estimated)", self.output_tokens)
        } else {
            format!("Output: {}", self.output_tokens)
        });

        let mut summary = parts.join(" | ");
        if !self.warnings.is_empty() {
            summary.push_str(&format!(" | Warnings: {}", self.warnings.len()));
        }
        summary
    }
}

/// `~4 characters per token`, the same approximation the original falls back
/// to when no tokenizer is available. Also used by `llmb-adapter` to
/// estimate token counts when a provider's stream carries no usage block.
pub fn estimate_tokens(text: &str) -> i64 {
    if text.is_empty() {
        return 0;
    }
    std::cmp::max(1, (text.chars().count() / 4) as i64)
}

/// Validates and corrects provider-reported token counts, estimating from
/// the prompt/response text when a provider reports a missing or zero count.
pub fn validate_token_counts(
    reported_input: Option<i64>,
    reported_output: Option<i64>,
    prompt: Option<&str>,
    response: Option<&str>,
) -> ValidationOutcome {
    let mut warnings = Vec::new();
    let mut is_valid = true;

    let (input_tokens, input_estimated) = match reported_input {
        Some(n) if n > 0 => (n, false),
        other => match prompt {
            Some(p) if !p.is_empty() => {
                let estimated = estimate_tokens(p);
                warnings.push(format!(
                    "Input tokens was {}, estimated {} from prompt",
                    fmt_reported(other),
                    estimated
                ));
                is_valid = false;
                (estimated, true)
            }
            _ => {
                warnings.push("Input tokens invalid and no prompt provided for estimation".to_string());
                is_valid = false;
                (0, false)
            }
        },
    };

    if input_tokens < MIN_INPUT_TOKENS {
        warnings.push(format!(
            "Input tokens ({input_tokens}) below minimum threshold ({MIN_INPUT_TOKENS})"
        ));
        is_valid = false;
    }

    let (output_tokens, output_estimated) = match reported_output {
        Some(n) if n > 0 => (n, false),
        other => match response {
            Some(r) if !r.is_empty() => {
                let estimated = estimate_tokens(r);
                warnings.push(format!(
                    "Output tokens was {}, estimated {} from response",
                    fmt_reported(other),
                    estimated
                ));
                is_valid = false;
                (estimated, true)
            }
            _ => {
                warnings.push("Output tokens invalid and no response provided for estimation".to_string());
                is_valid = false;
                (0, false)
            }
        },
    };

    ValidationOutcome {
        input_tokens,
        output_tokens,
        input_tokens_estimated: input_estimated,
        output_tokens_estimated: output_estimated,
        warnings,
        is_valid,
    }
}

fn fmt_reported(v: Option<i64>) -> String {
    match v {
        Some(n) => n.to_string(),
        None => "None".to_string(),
    }
}

/// A benchmark must be rewritten to `success=false` if the validated input
/// is below threshold, or if both counts are zero.
pub fn should_fail_benchmark(outcome: &ValidationOutcome) -> bool {
    if outcome.input_tokens < MIN_INPUT_TOKENS {
        return true;
    }
    outcome.input_tokens == 0 && outcome.output_tokens == 0
}

/// Truncates a successful call's response preview to `RESPONSE_TRUNCATE_CHARS`
/// characters, appending `...` when truncation occurred. Failed-call text is
/// left intact by callers (debugging value outweighs the storage cost).
pub fn truncate_response_text(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count <= RESPONSE_TRUNCATE_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(RESPONSE_TRUNCATE_CHARS).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_counts_pass_through_unchanged() {
        let outcome = validate_token_counts(Some(545), Some(127), None, None);
        assert_eq!(outcome.input_tokens, 545);
        assert_eq!(outcome.output_tokens, 127);
        assert!(!outcome.input_tokens_estimated);
        assert!(!outcome.output_tokens_estimated);
        assert!(outcome.is_valid);
        assert!(!should_fail_benchmark(&outcome));
    }

    #[test]
    fn zero_input_tokens_estimated_from_prompt_and_marked_invalid() {
        let prompt = "word ".repeat(200);
        let outcome = validate_token_counts(Some(0), Some(150), Some(&prompt), None);
        assert!(outcome.input_tokens_estimated);
        assert!(outcome.input_tokens > 0);
        assert!(!outcome.is_valid);
    }

    #[test]
    fn null_counts_with_no_text_fall_back_to_zero_and_fail() {
        let outcome = validate_token_counts(None, None, None, None);
        assert_eq!(outcome.input_tokens, 0);
        assert_eq!(outcome.output_tokens, 0);
        assert!(!outcome.is_valid);
        assert!(should_fail_benchmark(&outcome));
    }

    #[test]
    fn below_threshold_input_fails_even_with_nonzero_output() {
        let outcome = validate_token_counts(Some(5), Some(100), Some("Hi"), Some("Hello there!"));
        assert!(should_fail_benchmark(&outcome));
    }

    #[test]
    fn summary_reports_valid_when_no_issues() {
        let outcome = validate_token_counts(Some(500), Some(150), None, None);
        assert_eq!(outcome.summary(), "Token counts valid");
    }

    #[test]
    fn summary_includes_warning_count_when_invalid() {
        let outcome = validate_token_counts(None, None, None, None);
        assert!(outcome.summary().contains("Warnings:"));
    }

    #[test]
    fn truncate_leaves_short_text_untouched() {
        let text = "short response";
        assert_eq!(truncate_response_text(text), text);
    }

    #[test]
    fn truncate_clips_long_text_and_appends_ellipsis() {
        let text = "x".repeat(250);
        let truncated = truncate_response_text(&text);
        assert_eq!(truncated.chars().count(), 103);
        assert!(truncated.ends_with("..."));
    }
}
