use crate::PlatformKind;

use super::{recognize, PlaybackState, PlayerSignal, RawMessage};

type Handler<T> = Box<dyn FnMut(T) + Send>;

/// A single message handler dispatching recognized signals to callbacks.
pub struct MessageListener {
    platform: PlatformKind,
    on_time_update: Handler<f64>,
    on_state_change: Handler<PlaybackState>,
    on_error: Handler<String>,
}

impl MessageListener {
    /// Restricts platform specific shapes to the given platform's origins.
    pub fn for_platform(mut self, platform: PlatformKind) -> Self {
        self.platform = platform;
        self
    }

    /// Handles one message. Returns true if it was recognized.
    pub fn handle(&mut self, message: &RawMessage) -> bool {
        let Some(signal) = recognize(self.platform, message) else {
            return false;
        };

        match signal {
            PlayerSignal::TimeUpdate(seconds) => (self.on_time_update)(seconds),
            PlayerSignal::StateChange(state) => (self.on_state_change)(state),
            PlayerSignal::Error(error) => (self.on_error)(error),
        }

        true
    }
}

/// Creates a listener accepting the generic message shapes from any origin.
pub fn create_video_message_listener<T, S, E>(
    on_time_update: T,
    on_state_change: S,
    on_error: E,
) -> MessageListener
where
    T: FnMut(f64) + Send + 'static,
    S: FnMut(PlaybackState) + Send + 'static,
    E: FnMut(String) + Send + 'static,
{
    MessageListener {
        platform: PlatformKind::Unknown,
        on_time_update: Box::new(on_time_update),
        on_state_change: Box::new(on_state_change),
        on_error: Box::new(on_error),
    }
}
