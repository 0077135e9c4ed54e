//! Screen capture domain: public API.
//!
//! Capture is delegated to the OS interactive screenshot tool. This module
//! owns invoking it, classifying its result, and building the preview.

mod preview;
mod screencapture;

pub use preview::{fit_within, load_preview, make_preview, Preview, PreviewError};
pub use screencapture::ScreencaptureInvoker;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result of one interactive capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The tool wrote an image at this path.
    Success(PathBuf),
    /// The user dismissed the picker; no image was written.
    UserCancelled,
    Failure(String),
}

#[async_trait]
pub trait CaptureInvoker: Send + Sync {
    /// Let the user pick a region or window and write it to `destination`,
    /// replacing whatever a previous capture left there.
    async fn capture(&self, destination: &Path) -> CaptureOutcome;
}

/// The app window that must get out of the way while the user picks a
/// region. Implementations marshal to the UI thread themselves.
pub trait SurfaceVisibility: Send + Sync {
    fn hide_surface(&self);
    fn show_surface(&self);
}

/// Hides the surface for its lifetime. Dropping it, on any path including
/// unwinding, shows the surface again.
pub struct HiddenSurface<'a> {
    surface: &'a dyn SurfaceVisibility,
}

impl<'a> HiddenSurface<'a> {
    pub fn new(surface: &'a dyn SurfaceVisibility) -> Self {
        surface.hide_surface();
        Self { surface }
    }
}

impl Drop for HiddenSurface<'_> {
    fn drop(&mut self) {
        self.surface.show_surface();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<&'static str>>);

    impl SurfaceVisibility for Recorder {
        fn hide_surface(&self) {
            self.0.lock().unwrap().push("hide");
        }
        fn show_surface(&self) {
            self.0.lock().unwrap().push("show");
        }
    }

    #[test]
    fn guard_hides_then_shows() {
        let rec = Recorder::default();
        {
            let _hidden = HiddenSurface::new(&rec);
            assert_eq!(*rec.0.lock().unwrap(), vec!["hide"]);
        }
        assert_eq!(*rec.0.lock().unwrap(), vec!["hide", "show"]);
    }

    #[test]
    fn guard_shows_on_panic() {
        let rec = Recorder::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _hidden = HiddenSurface::new(&rec);
            panic!("capture blew up");
        }));
        assert!(result.is_err());
        assert_eq!(*rec.0.lock().unwrap(), vec!["hide", "show"]);
    }
}
