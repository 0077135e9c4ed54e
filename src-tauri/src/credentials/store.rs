//! Plain-file persistence for the API key and the one-time permission marker.
//!
//! Both files live in the per-user cache directory:
//!   macOS:   ~/Library/Caches/gemini_vision_app/
//!   Linux:   ~/.cache/gemini_vision_app/
//!   Windows: %LOCALAPPDATA%/gemini_vision_app/

use super::Credential;
use std::path::{Path, PathBuf};

const API_KEY_FILE: &str = "api_key.txt";
const PERMISSION_FLAG_FILE: &str = ".permission.granted";

/// Default cache directory for persisted app state.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gemini_vision_app")
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to create cache dir {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Loads and saves the API key at a fixed path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(API_KEY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored key. A missing or blank file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<Credential>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Credential::parse(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Overwrite the stored key.
    pub fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        ensure_parent(&self.path)?;
        write_private(&self.path, credential.expose()).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::info!("[STORE] API key saved ({} chars)", credential.expose().len());
        Ok(())
    }
}

/// Sentinel whose existence means the screen-recording onboarding
/// dialog has already been shown.
#[derive(Debug, Clone)]
pub struct PermissionMarker {
    path: PathBuf,
}

impl PermissionMarker {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(PERMISSION_FLAG_FILE),
        }
    }

    /// Returns `true` on the first call for this cache directory and
    /// records the marker, `false` on every later launch.
    pub fn take_first_run(&self) -> Result<bool, StoreError> {
        if self.path.exists() {
            return Ok(false);
        }
        ensure_parent(&self.path)?;
        std::fs::write(&self.path, "granted").map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::info!("[STORE] Permission marker created at {}", self.path.display());
        Ok(true)
    }
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| StoreError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a file left by an older save.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_dir_is_app_specific() {
        let dir = cache_dir();
        assert!(dir.to_string_lossy().ends_with("gemini_vision_app"));
    }

    #[test]
    fn load_missing_file_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(tmp.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_returns_same_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(&tmp.path().join("nested"));
        let key = Credential::parse("valid-key").unwrap();

        store.save(&key).unwrap();

        assert_eq!(store.load().unwrap(), Some(key));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "valid-key");
    }

    #[test]
    fn blank_file_loads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(tmp.path());
        std::fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn saved_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(tmp.path());
        store.save(&Credential::parse("k").unwrap()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_loose_key_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(tmp.path());
        std::fs::write(store.path(), "old-key").unwrap();
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        store.save(&Credential::parse("new-key").unwrap()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "new-key");
    }

    #[test]
    fn permission_marker_fires_once() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = PermissionMarker::new(tmp.path());
        assert!(marker.take_first_run().unwrap());
        assert!(!marker.take_first_run().unwrap());
        assert!(!PermissionMarker::new(tmp.path()).take_first_run().unwrap());
    }
}
