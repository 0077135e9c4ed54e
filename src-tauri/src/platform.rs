//! Host requirements checked before any window is created.

pub const UNSUPPORTED_HOST: &str =
    "This application is designed for macOS and uses the 'screencapture' utility.";

/// Install the `RUST_LOG` driven logger. Later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// `Err` carries the notice to print when this host cannot run the app.
pub fn check_host() -> Result<(), String> {
    if !cfg!(target_os = "macos") {
        return Err(UNSUPPORTED_HOST.to_string());
    }
    match which::which("screencapture") {
        Ok(path) => {
            log::debug!("[CAPTURE] Using {}", path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("[CAPTURE] screencapture not found: {}", e);
            Err(UNSUPPORTED_HOST.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_init_is_repeatable() {
        init_logging();
        init_logging();
        log::info!("[CAPTURE] logger installed");
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn non_macos_hosts_are_rejected() {
        assert_eq!(check_host(), Err(UNSUPPORTED_HOST.to_string()));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn macos_ships_screencapture() {
        assert!(check_host().is_ok());
    }
}
