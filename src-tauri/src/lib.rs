//! Gemini Vision: capture a screen region, ask a Gemini vision model to
//! transcribe it, and review the Markdown answer.
//!
//! The orchestration core is toolkit-agnostic:
//! - Workflow state machine and background jobs (workflow/)
//! - Screen capture through the macOS `screencapture` tool (capture/)
//! - Gemini model catalog and vision requests (llm/)
//! - Window presentation: review window vs. floating button (presentation.rs)
//!
//! The Tauri shell that drives it lives in desktop/, behind the `desktop`
//! feature.

pub mod capture;
pub mod clipboard;
pub mod config;
pub mod credentials;
pub mod export;
pub mod llm;
pub mod markdown;
pub mod platform;
pub mod presentation;
pub mod safety;
pub mod workflow;

#[cfg(feature = "desktop")]
mod desktop;

#[cfg(feature = "desktop")]
pub use desktop::run;
