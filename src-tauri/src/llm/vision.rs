//! Vision request: one screenshot plus one prompt in, Markdown text out.
//!
//! Single request/response. No streaming and no automatic retry: a retry
//! is the user pressing Process again.

use super::api::{self, API_KEY_HEADER};
use crate::credentials::Credential;
use crate::safety::redact;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::{Path, PathBuf};

/// Every variant's `Display` is the diagnostic shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Gemini API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response was blocked: {0}")]
    Blocked(String),

    #[error("Model returned no text (finish reason: {0})")]
    EmptyResponse(String),

    #[error("Could not read screenshot {}: {reason}", path.display())]
    ImageRead { path: PathBuf, reason: String },

    #[error("Generation task failed: {0}")]
    TaskFailed(String),
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// `prompt` is sent as given; blank-prompt defaulting happens upstream.
    async fn generate(
        &self,
        credential: &Credential,
        model_id: &str,
        prompt: &str,
        image_path: &Path,
    ) -> Result<String, GenerationError>;
}

/// `POST {base}/{model}:generateContent` with the image inlined as base64.
pub struct GeminiVision {
    client: reqwest::Client,
    api_base: String,
}

impl GeminiVision {
    pub fn new(api_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model_id: &str) -> String {
        let model = if model_id.starts_with("models/") {
            model_id.to_string()
        } else {
            format!("models/{}", model_id)
        };
        format!("{}/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl VisionClient for GeminiVision {
    async fn generate(
        &self,
        credential: &Credential,
        model_id: &str,
        prompt: &str,
        image_path: &Path,
    ) -> Result<String, GenerationError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| GenerationError::ImageRead {
                path: image_path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let mime_type = image::ImageFormat::from_path(image_path)
            .map(|f| f.to_mime_type())
            .unwrap_or("image/png");

        log::info!("[VISION] Model: {}", model_id);
        log::info!(
            "[VISION] Image: {} bytes ({}), prompt: {} chars",
            bytes.len(),
            mime_type,
            prompt.len()
        );

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint(model_id))
            .header(API_KEY_HEADER, credential.expose())
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": prompt },
                        {
                            "inline_data": {
                                "mime_type": mime_type,
                                "data": STANDARD.encode(&bytes),
                            }
                        }
                    ]
                }]
            }))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(api::transport_diagnostic(&e, credential)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = redact::scrub(&api::error_message(&body), Some(credential));
            log::error!("[VISION] API returned {}: {}", status, message);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            GenerationError::Transport(format!("Malformed response: {}", e))
        })?;

        log::info!("[VISION] API latency: {}ms", start.elapsed().as_millis());

        let text = extract_text(&body)?;
        log::info!("[VISION] Received {} chars of Markdown", text.len());
        Ok(text)
    }
}

/// Concatenate the answer parts of the first candidate.
///
/// Thought-summary parts (`"thought": true`) are skipped.
pub fn extract_text(body: &serde_json::Value) -> Result<String, GenerationError> {
    let Some(candidate) = body["candidates"].as_array().and_then(|c| c.first()) else {
        let reason = body["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned");
        return Err(GenerationError::Blocked(reason.to_string()));
    };

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter(|p| !p["thought"].as_bool().unwrap_or(false))
                .filter_map(|p| p["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate["finishReason"].as_str().unwrap_or("UNKNOWN");
        return Err(GenerationError::EmptyResponse(reason.to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_and_joins_text_parts() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "# Title\n\n" },
                    { "text": "Body text." }
                ]},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&body).unwrap(), "# Title\n\nBody text.");
    }

    #[test]
    fn skips_thought_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "thinking...", "thought": true },
                { "text": "answer" }
            ]}}]
        });
        assert_eq!(extract_text(&body).unwrap(), "answer");
    }

    #[test]
    fn blocked_prompt_reports_reason() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(
            extract_text(&body),
            Err(GenerationError::Blocked("SAFETY".to_string()))
        );
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let body = json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] });
        assert_eq!(
            extract_text(&body),
            Err(GenerationError::EmptyResponse("MAX_TOKENS".to_string()))
        );
    }

    #[test]
    fn endpoint_accepts_bare_and_prefixed_ids() {
        let client = GeminiVision::new("http://localhost/v1beta/");
        assert_eq!(
            client.endpoint("models/gemini-2.5-flash"),
            "http://localhost/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn api_error_display_is_verbatim_message() {
        let err = GenerationError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "Gemini API returned 429: quota exceeded");
    }
}
