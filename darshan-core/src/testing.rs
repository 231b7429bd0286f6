use parking_lot::Mutex;

use crate::{EmbedError, EmbedTarget};

/// An embed that records what was posted to it.
#[derive(Default)]
pub struct RecordingEmbed {
    posted: Mutex<Vec<(String, String)>>,
    source: Mutex<Option<String>>,
    reject: bool,
}

impl RecordingEmbed {
    /// An embed whose content window refuses every message.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    /// Returns the posted messages with their target origins.
    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.lock().clone()
    }
}

impl EmbedTarget for RecordingEmbed {
    fn post_message(&self, message: &str, target_origin: &str) -> Result<(), EmbedError> {
        if self.reject {
            return Err(EmbedError::Rejected("blocked by extension".to_string()));
        }

        self.posted
            .lock()
            .push((message.to_string(), target_origin.to_string()));

        Ok(())
    }

    fn set_source(&self, url: &str) {
        *self.source.lock() = Some(url.to_string());
    }

    fn source(&self) -> Option<String> {
        self.source.lock().clone()
    }
}
