//! Save-as export of the raw Markdown answer.

use std::path::{Path, PathBuf};

pub const MARKDOWN_EXTENSION: &str = "md";

#[derive(Debug, thiserror::Error)]
#[error("Could not save file:\n{0}")]
pub struct ExportError(#[from] std::io::Error);

/// Append `.md` when the chosen path has no extension.
pub fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(MARKDOWN_EXTENSION)
    }
}

/// Write `markdown` verbatim as UTF-8. Returns the path actually written.
pub fn save_markdown(path: &Path, markdown: &str) -> Result<PathBuf, ExportError> {
    let target = with_default_extension(path);
    std::fs::write(&target, markdown.as_bytes())?;
    log::info!("[EXPORT] Wrote {} bytes to {}", markdown.len(), target.display());
    Ok(target)
}
