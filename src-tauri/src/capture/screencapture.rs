//! Interactive capture via the macOS `screencapture` tool.
//!
//! This is the infrastructure layer: it spawns a process and inspects the
//! filesystem. `screencapture -i` exits 0 when the user presses Escape, so
//! cancellation is detected by the missing output file.

use super::{CaptureInvoker, CaptureOutcome, HiddenSurface, SurfaceVisibility};
use crate::config::CAPTURE_SETTLE_DELAY;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

pub struct ScreencaptureInvoker {
    program: String,
    args: Vec<String>,
    surface: Arc<dyn SurfaceVisibility>,
    settle_delay: Duration,
}

impl ScreencaptureInvoker {
    /// `screencapture -i <destination>` with the given window hidden.
    pub fn new(surface: Arc<dyn SurfaceVisibility>) -> Self {
        Self {
            program: "screencapture".to_string(),
            args: vec!["-i".to_string()],
            surface,
            settle_delay: CAPTURE_SETTLE_DELAY,
        }
    }

    /// Swap the tool. The destination path is appended after `args`.
    pub fn with_command(mut self, program: &str, args: &[&str]) -> Self {
        self.program = program.to_string();
        self.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

#[async_trait]
impl CaptureInvoker for ScreencaptureInvoker {
    async fn capture(&self, destination: &Path) -> CaptureOutcome {
        if let Err(e) = tokio::fs::remove_file(destination).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                return CaptureOutcome::Failure(format!(
                    "Could not replace previous screenshot {}: {}",
                    destination.display(),
                    e
                ));
            }
        }

        if let Some(dir) = destination.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                return CaptureOutcome::Failure(format!(
                    "Could not create screenshot directory {}: {}",
                    dir.display(),
                    e
                ));
            }
        }

        let start = std::time::Instant::now();
        let output = {
            let _hidden = HiddenSurface::new(self.surface.as_ref());
            tokio::time::sleep(self.settle_delay).await;
            Command::new(&self.program)
                .args(&self.args)
                .arg(destination)
                .output()
                .await
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                log::error!("[CAPTURE] Failed to run {}: {}", self.program, e);
                return CaptureOutcome::Failure(format!("Could not run {}: {}", self.program, e));
            }
        };

        log::info!(
            "[CAPTURE] {} exited with {} after {}ms",
            self.program,
            output.status,
            start.elapsed().as_millis()
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return CaptureOutcome::Failure(if detail.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                format!("{} exited with {}: {}", self.program, output.status, detail)
            });
        }

        if tokio::fs::try_exists(destination).await.unwrap_or(false) {
            CaptureOutcome::Success(destination.to_path_buf())
        } else {
            log::info!("[CAPTURE] No image written, treating as cancelled");
            CaptureOutcome::UserCancelled
        }
    }
}
