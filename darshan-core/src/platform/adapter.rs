use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{AdapterId, InboundQueue, PlayerSignal, RawMessage};

use super::{detect_platform, encode_command, extract_video_id, PlatformKind, PlayerCommand};

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Embed has no content window")]
    Detached,

    #[error("Message was rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Adapter is no longer bound to its embed")]
    Unbound,

    #[error("{platform:?} players do not support {command:?}")]
    Unsupported {
        platform: PlatformKind,
        command: PlayerCommand,
    },

    #[error("Failed to post command: {0}")]
    Embed(#[from] EmbedError),
}

/// The element holding an embedded player, like an iframe.
pub trait EmbedTarget: Send + Sync {
    /// Posts a message to the embed's content window.
    fn post_message(&self, message: &str, target_origin: &str) -> Result<(), EmbedError>;

    /// Sets the url the embed loads.
    fn set_source(&self, url: &str);

    /// Returns the url the embed currently loads.
    fn source(&self) -> Option<String>;
}

/// Presents one command and event interface over any embedded player.
///
/// An adapter exclusively owns its embed while bound. Call [Adapter::unbind] before binding another
/// adapter to the same embed, otherwise both would react to the same messages.
pub struct Adapter<E> {
    pub id: AdapterId,
    embed: Arc<E>,
    platform: PlatformKind,
    video_id: Option<String>,
    inbound: InboundQueue,
    bound: bool,
}

impl<E> Adapter<E>
where
    E: EmbedTarget,
{
    /// Loads the source into the embed and binds to it.
    pub fn bind(embed: Arc<E>, source_url: &str) -> Self {
        let platform = detect_platform(source_url);
        let video_id = extract_video_id(source_url, platform);

        if video_id.is_none() && platform != PlatformKind::Unknown {
            warn!(
                "Could not extract a video id from {}, the player will not be controlled",
                source_url
            );
        }

        if embed.source().as_deref() != Some(source_url) {
            embed.set_source(source_url);
        }

        let adapter = Self {
            id: AdapterId::next(),
            embed,
            platform,
            video_id,
            inbound: InboundQueue::default(),
            bound: true,
        };

        info!("Bound {} to {:?} player", adapter.id, platform);
        adapter
    }

    pub fn platform(&self) -> PlatformKind {
        self.platform
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Returns true if the player can be silenced without unmounting it.
    pub fn is_controllable(&self) -> bool {
        self.bound && self.video_id.is_some() && self.platform.supports_stop()
    }

    /// Sends a command to the player.
    ///
    /// This is best effort. Failures are logged and reported as `false`, since the content still
    /// renders even if the player ignores us.
    pub fn send_command(&self, command: PlayerCommand) -> bool {
        match self.try_send(command) {
            Ok(()) => true,
            Err(error) => {
                warn!("{} could not send {:?}: {}", self.id, command, error);
                false
            }
        }
    }

    /// Sends a command to the player, returning why it failed.
    pub fn try_send(&self, command: PlayerCommand) -> Result<(), AdapterError> {
        if !self.bound {
            return Err(AdapterError::Unbound);
        }

        let unsupported = AdapterError::Unsupported {
            platform: self.platform,
            command,
        };

        if self.video_id.is_none() {
            return Err(unsupported);
        }

        let message = encode_command(self.platform, command).ok_or(unsupported)?;
        self.embed
            .post_message(&message.payload, message.target_origin)?;

        Ok(())
    }

    pub fn play(&self) -> bool {
        self.send_command(PlayerCommand::Play)
    }

    pub fn pause(&self) -> bool {
        self.send_command(PlayerCommand::Pause)
    }

    pub fn stop(&self) -> bool {
        self.send_command(PlayerCommand::Stop)
    }

    pub fn seek(&self, seconds: f64) -> bool {
        self.send_command(PlayerCommand::Seek(seconds))
    }

    /// Queues a message received from the page.
    pub fn receive(&mut self, message: RawMessage) {
        if self.bound {
            self.inbound.push(message);
        }
    }

    /// Returns the signals recognized from queued messages, in arrival order.
    pub fn drain(&mut self) -> Vec<PlayerSignal> {
        self.inbound.drain(self.platform)
    }

    /// Releases the embed. Pending messages are dropped and further commands are refused.
    pub fn unbind(&mut self) {
        if !self.bound {
            return;
        }

        let dropped = self.inbound.clear();
        self.bound = false;

        debug!(
            "Unbound {} ({} pending messages dropped, {} ignored in total)",
            self.id,
            dropped,
            self.inbound.ignored()
        );
    }
}

#[cfg(test)]
mod test {
    use crate::testing::RecordingEmbed;

    use super::*;

    const YOUTUBE_EMBED: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ?enablejsapi=1";

    #[test]
    fn test_bind_sets_source() {
        let embed = Arc::new(RecordingEmbed::default());
        let adapter = Adapter::bind(embed.clone(), YOUTUBE_EMBED);

        assert_eq!(adapter.platform(), PlatformKind::YouTube);
        assert_eq!(adapter.video_id(), Some("dQw4w9WgXcQ"));
        assert_eq!(embed.source().as_deref(), Some(YOUTUBE_EMBED));
        assert!(adapter.is_controllable());
    }

    #[test]
    fn test_send_command() {
        let embed = Arc::new(RecordingEmbed::default());
        let adapter = Adapter::bind(embed.clone(), YOUTUBE_EMBED);

        assert!(adapter.pause());
        assert!(adapter.seek(30.));

        let posted = embed.posted();
        assert_eq!(posted.len(), 2);
        assert!(posted[0].0.contains("pauseVideo"));
        assert_eq!(posted[0].1, "*");
    }

    #[test]
    fn test_failures_are_not_fatal() {
        let embed = Arc::new(RecordingEmbed::rejecting());
        let adapter = Adapter::bind(embed, YOUTUBE_EMBED);

        assert!(!adapter.stop());
        assert!(matches!(
            adapter.try_send(PlayerCommand::Stop),
            Err(AdapterError::Embed(EmbedError::Rejected(_)))
        ));
    }

    #[test]
    fn test_unknown_platform_is_never_reset() {
        let embed = Arc::new(RecordingEmbed::default());
        let source = "https://www.podbean.com/player-v2/?i=abc";
        let adapter = Adapter::bind(embed.clone(), source);

        assert!(!adapter.is_controllable());
        assert!(!adapter.stop());
        assert!(embed.posted().is_empty());
        assert_eq!(embed.source().as_deref(), Some(source));
    }

    #[test]
    fn test_unbound_adapter_refuses_commands() {
        let embed = Arc::new(RecordingEmbed::default());
        let mut adapter = Adapter::bind(embed.clone(), YOUTUBE_EMBED);

        adapter.receive(RawMessage::text(
            "https://www.youtube.com",
            r#"{"event":"video-progress","currentTime":3}"#,
        ));
        adapter.unbind();

        assert!(matches!(
            adapter.try_send(PlayerCommand::Pause),
            Err(AdapterError::Unbound)
        ));
        assert!(adapter.drain().is_empty());
        assert!(embed.posted().is_empty());
    }
}
