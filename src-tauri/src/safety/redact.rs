//! Credential redaction for diagnostic text.
//!
//! Transport errors can echo request URLs, and API error bodies sometimes
//! quote the key back. Both are scrubbed here.

use crate::credentials::Credential;
use regex::Regex;
use std::sync::LazyLock;

static SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // `key=...` query parameters in echoed URLs
        (
            Regex::new(r"([?&](?:key|api_key)=)[^&\s)]+").unwrap(),
            "${1}[REDACTED]",
        ),
        // Google API keys (AIza + 35 chars)
        (
            Regex::new(r"\bAIza[0-9A-Za-z_-]{35}\b").unwrap(),
            "[REDACTED]",
        ),
    ]
});

/// Scrub known secret shapes and, if given, the literal credential.
pub fn scrub(text: &str, credential: Option<&Credential>) -> String {
    let mut cleaned = match credential {
        Some(c) => text.replace(c.expose(), "[REDACTED]"),
        None => text.to_string(),
    };

    for (pattern, replacement) in SECRET_PATTERNS.iter() {
        if pattern.is_match(&cleaned) {
            cleaned = pattern.replace_all(&cleaned, *replacement).to_string();
        }
    }

    if cleaned != text {
        log::debug!("[SAFETY] Redacted credential material from diagnostic");
    }
    cleaned
}
