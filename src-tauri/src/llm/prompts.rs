//! Prompt text sent alongside the screenshot.

/// Used when the user leaves the prompt blank.
pub const DEFAULT_PROMPT: &str = "Transcribe this screenshot into a Markdown document.";

/// Pre-filled into the prompt field of the review window.
pub const PROMPT_PLACEHOLDER: &str = "Transcribe this into a Markdown document.";

/// The trimmed user prompt, or [`DEFAULT_PROMPT`] when it is blank.
pub fn effective_prompt(user_prompt: &str) -> String {
    let trimmed = user_prompt.trim();
    if trimmed.is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        trimmed.to_string()
    }
}
