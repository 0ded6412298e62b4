//! Model-name normalization.
//!
//! A bit-exact port of the original `model_name_normalizer.py`: converts
//! provider-specific raw API strings into one clean name per model, so that
//! `(provider, normalized_name)` is a stable catalog key across API
//! revisions (e.g. `accounts/fireworks/models/llama-v3p3-70b-instruct` and
//! `meta-llama/Llama-3.3-70B-Instruct` both land on `llama-3.3-70b-instruct`).
//!
//! Idempotent: normalizing an already-normalized name returns it unchanged.

use std::sync::OnceLock;

use regex::Regex;

const VERSION_REPLACEMENTS: &[(&str, &str)] = &[
    ("v3p3", "3.3"),
    ("v3p2", "3.2"),
    ("v3p1", "3.1"),
    ("v2p5", "2.5"),
    ("v2p0", "2.0"),
    ("v1p5", "1.5"),
];

const FAMILY_TOKENS: &[&str] = &["llama", "mixtral", "mistral", "qwen"];

fn size_suffix_mid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)B-").unwrap())
}

fn size_suffix_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)B$").unwrap())
}

fn family_token_re(token: &str) -> Regex {
    Regex::new(&format!("(?i){}", regex::escape(token))).expect("static pattern")
}

/// Strips the leading `provider/` or known vendor path segment from a raw
/// model name. Mirrors `PROVIDER_PREFIXES`: the generic `^[^/]+/` rule runs
/// before the vendor-specific ones, so those never actually fire — kept
/// here anyway so the prefix list stays a faithful 1:1 mirror.
fn strip_provider_prefixes(name: &str) -> String {
    let mut s = name.to_string();

    const FIREWORKS_PREFIX: &str = "accounts/fireworks/models/";
    if let Some(rest) = s.strip_prefix(FIREWORKS_PREFIX) {
        s = rest.to_string();
    }

    const GOOGLE_PREFIX: &str = "models/";
    if let Some(rest) = s.strip_prefix(GOOGLE_PREFIX) {
        s = rest.to_string();
    }

    if let Some(idx) = s.find('/') {
        s = s[idx + 1..].to_string();
    }

    for prefix in ["meta-llama/", "mistralai/", "NousResearch/", "Qwen/"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.to_string();
        }
    }

    s
}

fn collapse_repeated_hyphens(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_was_hyphen = false;
    for c in s.chars() {
        if c == '-' {
            if prev_was_hyphen {
                continue;
            }
            prev_was_hyphen = true;
        } else {
            prev_was_hyphen = false;
        }
        out.push(c);
    }
    out
}

/// Normalizes a raw provider model name to its canonical stored form.
pub fn normalize_model_name(raw_model_name: &str) -> String {
    if raw_model_name.is_empty() {
        return raw_model_name.to_string();
    }

    let mut normalized = raw_model_name.trim().to_string();

    normalized = strip_provider_prefixes(&normalized);

    for (pattern, replacement) in VERSION_REPLACEMENTS {
        normalized = normalized.replace(pattern, replacement);
    }

    for token in FAMILY_TOKENS {
        if normalized.to_lowercase().contains(token) {
            normalized = family_token_re(token).replace_all(&normalized, *token).into_owned();
        }
    }

    normalized = normalized.replace("-Instruct", "-instruct");
    normalized = normalized.replace("_instruct", "-instruct");

    normalized = normalized.replace('_', "-");

    normalized = collapse_repeated_hyphens(&normalized);

    normalized = size_suffix_mid_re().replace_all(&normalized, "${1}b-").into_owned();
    normalized = size_suffix_end_re().replace_all(&normalized, "${1}b").into_owned();

    normalized.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_provider_formats() {
        let cases = [
            ("accounts/fireworks/models/llama-v3p3-70b-instruct", "llama-3.3-70b-instruct"),
            ("accounts/fireworks/models/llama-v3p1-405b-instruct", "llama-3.1-405b-instruct"),
            ("accounts/fireworks/models/qwen2p5-72b-instruct", "qwen2p5-72b-instruct"),
            ("models/gemini-2.5-flash", "gemini-2.5-flash"),
            ("models/gemini-1.5-pro", "gemini-1.5-pro"),
            ("openai/gpt-4o", "gpt-4o"),
            ("anthropic/claude-3-5-sonnet", "claude-3-5-sonnet"),
            ("meta-llama/Llama-3.3-70B-Instruct", "llama-3.3-70b-instruct"),
            ("gpt-4o-mini", "gpt-4o-mini"),
            ("llama-3.1-8b-instant", "llama-3.1-8b-instant"),
            ("mistral-large-latest", "mistral-large-latest"),
        ];
        for (raw, expected) in cases {
            assert_eq!(normalize_model_name(raw), expected, "input: {raw}");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_model_name("meta-llama/Llama-3.3-70B-Instruct");
        let twice = normalize_model_name(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_name_passes_through() {
        assert_eq!(normalize_model_name(""), "");
    }
}
