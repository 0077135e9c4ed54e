//! System clipboard access.

#[derive(Debug, thiserror::Error)]
#[error("Clipboard unavailable: {0}")]
pub struct ClipboardError(String);

pub trait ClipboardSink: Send {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard via `arboard`, opened per copy.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut board = arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?;
        board
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError(e.to_string()))
    }
}
