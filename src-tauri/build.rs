//! Build script for the Gemini Vision app.
//!
//! Only the desktop shell needs a build step: tauri-build generates the
//! context from tauri.conf.json. The core library builds without it.

fn main() {
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
