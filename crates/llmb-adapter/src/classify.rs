//! Maps an HTTP status / exception message to the error taxonomy.

use llmb_schemas::ErrorKind;

pub fn classify(status: Option<u16>, message: &str) -> (ErrorKind, Option<i32>) {
    let lower = message.to_lowercase();

    if status == Some(429) || lower.contains("ratelimit") || lower.contains("rate limit") {
        return (ErrorKind::RateLimit, Some(429));
    }
    match status {
        Some(401) => return (ErrorKind::AuthError, Some(401)),
        Some(400) => return (ErrorKind::BadRequest, Some(400)),
        Some(404) => return (ErrorKind::NotFound, Some(404)),
        _ => {}
    }
    if lower.contains("timeout") {
        return (ErrorKind::Timeout, Some(504));
    }
    if lower.contains("credit balance") {
        return (ErrorKind::InsufficientCredits, Some(402));
    }
    (ErrorKind::UnknownError, Some(status.map(i32::from).unwrap_or(500)))
}

/// Whether the adapter's local bounded retry applies: 5xx or a handful of
/// well-known transient network phrases. 429 and all other 4xx are excluded
/// — those are the queue's job, not the adapter's.
pub fn is_adapter_retryable(status: Option<u16>, message: &str) -> bool {
    if let Some(code) = status {
        if (500..600).contains(&code) {
            return true;
        }
    }
    let lower = message.to_lowercase();
    ["502", "503", "504", "timeout", "connection reset", "connection refused", "temporary failure"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_classifies_as_rate_limit_regardless_of_message() {
        assert_eq!(classify(Some(429), "slow down").0, ErrorKind::RateLimit);
    }

    #[test]
    fn message_mentioning_credit_balance_classifies_as_insufficient_credits() {
        let (kind, status) = classify(Some(400), "Your credit balance is too low");
        assert_eq!(kind, ErrorKind::InsufficientCredits);
        assert_eq!(status, Some(402));
    }

    #[test]
    fn unclassified_falls_back_to_unknown_error() {
        assert_eq!(classify(None, "something broke").0, ErrorKind::UnknownError);
    }

    #[test]
    fn five_xx_is_adapter_retryable_but_four_xx_is_not() {
        assert!(is_adapter_retryable(Some(503), ""));
        assert!(!is_adapter_retryable(Some(429), ""));
        assert!(!is_adapter_retryable(Some(400), ""));
    }

    #[test]
    fn connection_reset_message_is_adapter_retryable_without_a_status() {
        assert!(is_adapter_retryable(None, "connection reset by peer"));
    }
}
