use serde::Serialize;

mod adapter;
mod command;
mod extract;

pub use adapter::*;
pub use command::*;
pub use extract::*;

/// The vendor behind an embedded player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    YouTube,
    Cloudflare,
    Vimeo,
    Rumble,
    /// Any other host. There is no control channel for these, so a block has to unmount the player.
    Unknown,
}

/// Describes what the engine can do with a player of a given platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The origin commands are posted to, or `None` if the player can't be controlled.
    pub target_origin: Option<&'static str>,
    /// The origins messages from this player are expected to come from.
    pub message_origins: &'static [&'static str],
    pub can_play: bool,
    pub can_pause: bool,
    pub can_stop: bool,
    pub can_seek: bool,
}

const YOUTUBE: Capabilities = Capabilities {
    // The YouTube IFrame API doesn't care about the origin, and the messages carry no secrets.
    target_origin: Some("*"),
    message_origins: &[
        "https://www.youtube.com",
        "https://www.youtube-nocookie.com",
    ],
    can_play: true,
    can_pause: true,
    can_stop: true,
    can_seek: true,
};

const CLOUDFLARE: Capabilities = Capabilities {
    target_origin: Some("https://iframe.videodelivery.net"),
    message_origins: &["https://iframe.videodelivery.net"],
    can_play: true,
    can_pause: true,
    // Stop is sent as a pause
    can_stop: true,
    can_seek: false,
};

const VIMEO: Capabilities = Capabilities {
    target_origin: Some("https://player.vimeo.com"),
    message_origins: &["https://player.vimeo.com"],
    can_play: true,
    can_pause: true,
    can_stop: true,
    can_seek: true,
};

const UNCONTROLLABLE: Capabilities = Capabilities {
    target_origin: None,
    message_origins: &[],
    can_play: false,
    can_pause: false,
    can_stop: false,
    can_seek: false,
};

impl PlatformKind {
    /// Returns the capability table entry for this platform.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            PlatformKind::YouTube => YOUTUBE,
            PlatformKind::Cloudflare => CLOUDFLARE,
            PlatformKind::Vimeo => VIMEO,
            PlatformKind::Rumble | PlatformKind::Unknown => UNCONTROLLABLE,
        }
    }

    /// Returns true if the player can be silenced without being unmounted.
    pub fn supports_stop(&self) -> bool {
        let capabilities = self.capabilities();
        capabilities.can_stop || capabilities.can_pause
    }

    /// Returns true if the given command has a real control channel on this platform.
    pub fn supports(&self, command: &PlayerCommand) -> bool {
        let capabilities = self.capabilities();

        match command {
            PlayerCommand::Play => capabilities.can_play,
            PlayerCommand::Pause => capabilities.can_pause,
            PlayerCommand::Stop => capabilities.can_stop,
            PlayerCommand::Seek(_) => capabilities.can_seek,
        }
    }

    /// Returns true if a message from the given origin could have come from this platform's player.
    pub fn accepts_origin(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');

        self.capabilities()
            .message_origins
            .iter()
            .any(|o| *o == origin)
            || (*self == PlatformKind::Cloudflare
                && origin.starts_with("https://")
                && origin.ends_with(".cloudflarestream.com"))
    }
}

/// Classifies a url by the host families it mentions.
pub fn detect_platform(source_url: &str) -> PlatformKind {
    let url = source_url.to_ascii_lowercase();

    if url.contains("youtube.com") || url.contains("youtu.be") {
        return PlatformKind::YouTube;
    }

    if url.contains("videodelivery.net") || url.contains("cloudflarestream.com") {
        return PlatformKind::Cloudflare;
    }

    if url.contains("vimeo.com") {
        return PlatformKind::Vimeo;
    }

    if url.contains("rumble.com") {
        return PlatformKind::Rumble;
    }

    PlatformKind::Unknown
}
