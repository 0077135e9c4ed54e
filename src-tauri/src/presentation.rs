//! Expanded review window vs. minimized floating button.
//!
//! Owns window visibility only. Switching modes never touches workflow
//! state, so minimizing during a generation call lets it finish.

use crate::config::QUIT_GRACE_DELAY;
use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PresentationMode {
    Expanded,
    Minimized,
}

/// The two top-level surfaces and process exit, as the toolkit exposes them.
pub trait WindowHost: Send + Sync + 'static {
    fn show_main(&self);
    fn hide_main(&self);
    fn focus_main(&self);
    fn show_floater(&self);
    fn hide_floater(&self);
    fn exit(&self);
}

pub struct PresentationController<H: WindowHost> {
    mode: PresentationMode,
    host: Arc<H>,
    runtime: Handle,
    quit_scheduled: bool,
}

impl<H: WindowHost> PresentationController<H> {
    /// Put the windows into `initial` mode right away.
    pub fn new(host: Arc<H>, runtime: Handle, initial: PresentationMode) -> Self {
        match initial {
            PresentationMode::Expanded => {
                host.hide_floater();
                host.show_main();
                host.focus_main();
            }
            PresentationMode::Minimized => {
                host.hide_main();
                host.show_floater();
            }
        }
        Self {
            mode: initial,
            host,
            runtime,
            quit_scheduled: false,
        }
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    /// Hide the review window and show the floating button.
    pub fn minimize(&mut self) {
        if self.mode == PresentationMode::Minimized {
            return;
        }
        log::info!("[WINDOW] Minimizing to floating button");
        self.host.hide_main();
        self.host.show_floater();
        self.mode = PresentationMode::Minimized;
    }

    /// Hide the floating button, show the review window and focus it.
    /// When already expanded this only brings the window to the front.
    pub fn expand(&mut self) {
        if self.mode == PresentationMode::Minimized {
            log::info!("[WINDOW] Expanding review window");
            self.host.hide_floater();
            self.host.show_main();
        }
        self.host.focus_main();
        self.mode = PresentationMode::Expanded;
    }

    /// The review window's close button minimizes instead of quitting.
    pub fn on_close_requested(&mut self) {
        self.minimize();
    }

    /// Exit the process after [`QUIT_GRACE_DELAY`]. Returns `false` if a
    /// quit is already pending.
    pub fn request_quit(&mut self) -> bool {
        if self.quit_scheduled {
            return false;
        }
        self.quit_scheduled = true;
        log::info!("[WINDOW] Quit requested");

        let host = Arc::clone(&self.host);
        self.runtime.spawn(async move {
            tokio::time::sleep(QUIT_GRACE_DELAY).await;
            host.exit();
        });
        true
    }
}
