use darshan_core::{EmbedError, EmbedTarget};
use log::info;
use parking_lot::Mutex;

/// An embed without a page behind it. Whatever the engine sends it is logged.
#[derive(Debug, Default)]
pub struct LoggingEmbed {
    source: Mutex<Option<String>>,
}

impl EmbedTarget for LoggingEmbed {
    fn post_message(&self, message: &str, target_origin: &str) -> Result<(), EmbedError> {
        if self.source.lock().is_none() {
            return Err(EmbedError::Detached);
        }

        info!("-> {} {}", target_origin, message);
        Ok(())
    }

    fn set_source(&self, url: &str) {
        info!("Embed now loads {}", url);
        *self.source.lock() = Some(url.to_string());
    }

    fn source(&self) -> Option<String> {
        self.source.lock().clone()
    }
}
