use serde::Serialize;
use serde_json::{json, Value};

use super::PlatformKind;

/// A uniform command for any controllable player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "command", content = "seconds", rename_all = "snake_case")]
pub enum PlayerCommand {
    Play,
    Pause,
    Stop,
    /// Seek to the given position, in seconds.
    Seek(f64),
}

/// A message ready to be posted to an embed's content window.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// The JSON encoded body.
    pub payload: String,
    pub target_origin: &'static str,
}

/// Encodes a command in the vendor's own postMessage protocol.
///
/// Returns `None` if the platform has no control channel, or doesn't support the command.
pub fn encode_command(platform: PlatformKind, command: PlayerCommand) -> Option<OutboundMessage> {
    let target_origin = platform.capabilities().target_origin?;

    if !platform.supports(&command) {
        return None;
    }

    let body = match platform {
        PlatformKind::YouTube => youtube_command(command),
        PlatformKind::Cloudflare => cloudflare_command(command)?,
        PlatformKind::Vimeo => vimeo_command(command),
        PlatformKind::Rumble | PlatformKind::Unknown => return None,
    };

    Some(OutboundMessage {
        payload: body.to_string(),
        target_origin,
    })
}

fn youtube_command(command: PlayerCommand) -> Value {
    let (func, args) = match command {
        PlayerCommand::Play => ("playVideo", json!([])),
        PlayerCommand::Pause => ("pauseVideo", json!([])),
        PlayerCommand::Stop => ("stopVideo", json!([])),
        // The second argument allows seeking ahead of what has been buffered
        PlayerCommand::Seek(seconds) => ("seekTo", json!([seconds, true])),
    };

    json!({ "event": "command", "func": func, "args": args })
}

fn cloudflare_command(command: PlayerCommand) -> Option<Value> {
    let kind = match command {
        PlayerCommand::Play => "play",
        // Stream has no stop, pausing keeps the audio from playing under the overlay
        PlayerCommand::Pause | PlayerCommand::Stop => "pause",
        PlayerCommand::Seek(_) => return None,
    };

    Some(json!({ "type": kind }))
}

fn vimeo_command(command: PlayerCommand) -> Value {
    match command {
        PlayerCommand::Play => json!({ "method": "play" }),
        PlayerCommand::Pause | PlayerCommand::Stop => json!({ "method": "pause" }),
        PlayerCommand::Seek(seconds) => json!({ "method": "setCurrentTime", "value": seconds }),
    }
}
