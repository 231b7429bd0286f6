use crossbeam::channel::{unbounded, Receiver, Sender};
use log::debug;
use serde::Serialize;

use crate::{AdapterId, PlatformKind, PlaybackState, PlayerCommand};

pub type EventSender = Sender<PreviewEvent>;
pub type EventReceiver = Receiver<PreviewEvent>;

/// Describes the events that can be emitted by a mounted teaching.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PreviewEvent {
    /// A player was bound to the teaching's primary source.
    Mounted {
        teaching_id: String,
        adapter_id: AdapterId,
        platform: PlatformKind,
    },
    /// The viewer picked another source, and the preview started over.
    SourceSelected {
        teaching_id: String,
        adapter_id: AdapterId,
        platform: PlatformKind,
        index: usize,
    },
    /// A sample was taken from the player.
    TimeUpdate {
        adapter_id: AdapterId,
        /// Seconds watched so far.
        elapsed: f64,
        /// Percentage of the budget used.
        progress: f64,
    },
    StateChange {
        adapter_id: AdapterId,
        state: PlaybackState,
    },
    PlayerError {
        adapter_id: AdapterId,
        message: String,
    },
    /// A command could not be delivered to the player.
    CommandFailed {
        adapter_id: AdapterId,
        command: PlayerCommand,
    },
    /// The viewer ran out of preview and the overlay was raised.
    Blocked {
        teaching_id: String,
        adapter_id: AdapterId,
        /// Seconds watched when the block happened.
        elapsed: f64,
        budget: f64,
    },
    Unmounted {
        teaching_id: String,
        adapter_id: AdapterId,
    },
}

/// Sends events to whoever is listening. Nobody listening is fine.
#[derive(Debug, Clone)]
pub struct Emitter {
    sender: EventSender,
}

impl Emitter {
    pub fn new(sender: EventSender) -> Self {
        Self { sender }
    }

    /// Creates an emitter and the receiving end of its channel.
    pub fn channel() -> (Self, EventReceiver) {
        let (sender, receiver) = unbounded();
        (Self::new(sender), receiver)
    }

    /// An emitter whose events go nowhere.
    pub fn disconnected() -> Self {
        let (sender, _) = unbounded();
        Self::new(sender)
    }

    pub fn emit(&self, event: PreviewEvent) {
        if let Err(error) = self.sender.send(event) {
            debug!("Dropped event, no receiver: {:?}", error.into_inner());
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_emit_without_receiver() {
        let emitter = Emitter::disconnected();

        emitter.emit(PreviewEvent::Unmounted {
            teaching_id: "1".to_string(),
            adapter_id: AdapterId::next(),
        });
    }

    #[test]
    fn test_event_serialization() {
        let adapter_id = AdapterId::next();
        let event = PreviewEvent::Blocked {
            teaching_id: "42".to_string(),
            adapter_id,
            elapsed: 300.,
            budget: 300.,
        };

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "blocked");
        assert_eq!(value["adapter_id"], adapter_id.value());
        assert_eq!(value["elapsed"], 300.);
    }
}
