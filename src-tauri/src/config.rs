//! Runtime configuration resolved from the environment.
//!
//! An optional `.env` file is loaded first, so any variable below can be
//! set there during development.

use crate::credentials::{self, Credential};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PREFERRED_MODEL: &str = "models/gemini-2.5-flash";
/// File name of the capture artifact inside the cache directory.
pub const CAPTURE_FILE_NAME: &str = "temp_screenshot.png";

/// Bounding box for the screenshot preview shown next to the prompt.
pub const PREVIEW_MAX_WIDTH: u32 = 550;
pub const PREVIEW_MAX_HEIGHT: u32 = 450;

/// Pause after hiding our window so it is gone before the picker appears.
pub const CAPTURE_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Delay between a quit request and process exit, so a dismissing
/// context menu finishes its event first.
pub const QUIT_GRACE_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Generative Language API, without trailing slash.
    pub api_base: String,
    /// Model selected by default when the catalog offers it.
    pub preferred_model: String,
    /// Where the capture tool writes its image. Overwritten per capture.
    /// Defaults to a file in `cache_dir`, since a bundled app starts with
    /// an unwritable working directory.
    pub capture_path: PathBuf,
    /// Holds the persisted key and the permission marker.
    pub cache_dir: PathBuf,
    /// Key from `GEMINI_API_KEY`, used when nothing is persisted yet.
    pub env_credential: Option<Credential>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cache_dir = credentials::cache_dir();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            preferred_model: DEFAULT_PREFERRED_MODEL.to_string(),
            capture_path: cache_dir.join(CAPTURE_FILE_NAME),
            cache_dir,
            env_credential: None,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any) and resolve from the process environment.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("[CONFIG] Loaded {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("[CONFIG] Ignoring unreadable .env: {}", e),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let cache_dir = get("GEMINI_VISION_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        Self {
            api_base: get("GEMINI_VISION_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            preferred_model: get("GEMINI_VISION_MODEL").unwrap_or(defaults.preferred_model),
            capture_path: get("GEMINI_VISION_CAPTURE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| cache_dir.join(CAPTURE_FILE_NAME)),
            cache_dir,
            env_credential: get("GEMINI_API_KEY").and_then(|v| Credential::parse(&v)),
        }
    }
}
