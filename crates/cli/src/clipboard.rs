use bilingual_pad_core::clipboard::{Clipboard, ClipboardError};
use std::sync::Mutex;

/// The OS clipboard. The handle is opened on first copy and kept for the rest
/// of the session, since on X11 the contents go away with it.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard handle poisoned".into()))?;
        if handle.is_none() {
            *handle = Some(arboard::Clipboard::new().map_err(map_error)?);
        }
        match handle.as_mut() {
            Some(clipboard) => clipboard.set_text(text).map_err(map_error),
            None => Err(ClipboardError::Unavailable("clipboard not opened".into())),
        }
    }
}

fn map_error(e: arboard::Error) -> ClipboardError {
    match e {
        arboard::Error::ClipboardNotSupported | arboard::Error::ClipboardOccupied => {
            ClipboardError::Unavailable(e.to_string())
        }
        other => ClipboardError::Write(other.to_string()),
    }
}
