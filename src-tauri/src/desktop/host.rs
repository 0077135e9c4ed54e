//! Window control backed by the Tauri app handle.
//!
//! Tauri window calls are safe from any thread; they are forwarded to the
//! event loop internally.

use crate::capture::SurfaceVisibility;
use crate::presentation::WindowHost;
use tauri::{AppHandle, Manager, WebviewWindow};

pub const MAIN_WINDOW: &str = "main";
pub const FLOATER_WINDOW: &str = "floater";

#[derive(Clone)]
pub struct TauriWindowHost {
    app: AppHandle,
}

impl TauriWindowHost {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn with_window(
        &self,
        label: &str,
        op: &str,
        f: impl FnOnce(&WebviewWindow) -> tauri::Result<()>,
    ) {
        match self.app.get_webview_window(label) {
            Some(window) => {
                if let Err(e) = f(&window) {
                    log::error!("[WINDOW] {} {} failed: {}", op, label, e);
                }
            }
            None => log::error!("[WINDOW] No window labelled {}", label),
        }
    }
}

impl WindowHost for TauriWindowHost {
    fn show_main(&self) {
        self.with_window(MAIN_WINDOW, "show", |w| w.show());
    }

    fn hide_main(&self) {
        self.with_window(MAIN_WINDOW, "hide", |w| w.hide());
    }

    fn focus_main(&self) {
        self.with_window(MAIN_WINDOW, "focus", |w| w.set_focus());
    }

    fn show_floater(&self) {
        self.with_window(FLOATER_WINDOW, "show", |w| w.show());
    }

    fn hide_floater(&self) {
        self.with_window(FLOATER_WINDOW, "hide", |w| w.hide());
    }

    fn exit(&self) {
        log::info!("[WINDOW] Exiting");
        self.app.exit(0);
    }
}

/// During capture the review window is what has to get out of the way.
impl SurfaceVisibility for TauriWindowHost {
    fn hide_surface(&self) {
        self.hide_main();
    }

    fn show_surface(&self) {
        self.show_main();
    }
}
