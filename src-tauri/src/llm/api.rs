//! Shared plumbing for the Generative Language REST API.

use crate::credentials::Credential;
use crate::safety::redact;

/// Header carrying the key, so it never appears in request URLs.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Pull `error.message` out of an API error body, falling back to the
/// raw body (or a placeholder when it is empty).
pub fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string));

    match parsed {
        Some(message) => message,
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => body.trim().to_string(),
    }
}

/// Render a transport error for the user without leaking the key.
pub fn transport_diagnostic(err: &reqwest::Error, credential: &Credential) -> String {
    redact::scrub(&err.to_string(), Some(credential))
}
