use log::trace;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::PlatformKind;

mod listener;
mod queue;

pub use listener::*;
pub use queue::*;

/// A message event as delivered to the page.
///
/// The page's message bus is shared with every other frame on it, so nothing about a raw message
/// is trusted until a recognizer has accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub origin: String,
    pub data: MessageData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageData {
    /// Most players post JSON encoded strings.
    Text(String),
    /// Some post structured objects directly.
    Json(Value),
}

/// Something a player told us.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PlayerSignal {
    /// The current playback position, in seconds.
    TimeUpdate(f64),
    StateChange(PlaybackState),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Unstarted,
    Playing,
    Paused,
    Buffering,
    Ended,
    Cued,
}

impl RawMessage {
    pub fn text(origin: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            data: MessageData::Text(data.into()),
        }
    }

    pub fn json(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data: MessageData::Json(data),
        }
    }

    /// Returns the payload as a JSON object, if it is one.
    /// Unparseable payloads are expected on a shared bus and yield `None`.
    fn object(&self) -> Option<Map<String, Value>> {
        let value = match &self.data {
            MessageData::Text(text) => serde_json::from_str(text).ok()?,
            MessageData::Json(value) => value.clone(),
        };

        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl PlaybackState {
    /// Maps the YouTube IFrame API player state codes.
    pub fn from_youtube_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "unstarted" => Some(Self::Unstarted),
            "play" | "playing" => Some(Self::Playing),
            "pause" | "paused" => Some(Self::Paused),
            "buffering" | "waiting" => Some(Self::Buffering),
            "ended" => Some(Self::Ended),
            "cued" => Some(Self::Cued),
            _ => None,
        }
    }
}

/// Turns a raw message into a signal, if it has a shape we know.
///
/// The platform's own recognizer runs first and only accepts messages from the platform's
/// origins. The generic shapes are accepted from anywhere, since custom players post them from
/// the page itself.
pub fn recognize(platform: PlatformKind, message: &RawMessage) -> Option<PlayerSignal> {
    let object = message.object()?;

    let platform_signal = if platform.accepts_origin(&message.origin) {
        match platform {
            PlatformKind::YouTube => recognize_youtube(&object),
            PlatformKind::Vimeo => recognize_vimeo(&object),
            _ => None,
        }
    } else {
        None
    };

    let signal = platform_signal.or_else(|| recognize_generic(&object));

    if signal.is_none() {
        trace!("Ignored message from {}", message.origin);
    }

    signal
}

fn recognize_youtube(object: &Map<String, Value>) -> Option<PlayerSignal> {
    let info = object.get("info");

    match object.get("event")?.as_str()? {
        "infoDelivery" => {
            let info = info?.as_object()?;

            info.get("currentTime")
                .and_then(seconds)
                .map(PlayerSignal::TimeUpdate)
                .or_else(|| {
                    info.get("playerState")
                        .and_then(Value::as_i64)
                        .and_then(PlaybackState::from_youtube_code)
                        .map(PlayerSignal::StateChange)
                })
        }
        "onStateChange" => info
            .and_then(Value::as_i64)
            .and_then(PlaybackState::from_youtube_code)
            .map(PlayerSignal::StateChange),
        "onError" => {
            let code = info.map(Value::to_string).unwrap_or_default();
            Some(PlayerSignal::Error(format!("YouTube player error {}", code)))
        }
        _ => None,
    }
}

fn recognize_vimeo(object: &Map<String, Value>) -> Option<PlayerSignal> {
    let data = object.get("data").and_then(Value::as_object);

    match object.get("event")?.as_str()? {
        "timeupdate" | "playProgress" => data?
            .get("seconds")
            .and_then(seconds)
            .map(PlayerSignal::TimeUpdate),
        "error" => {
            let message = data
                .and_then(|d| d.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("Vimeo player error");

            Some(PlayerSignal::Error(message.to_string()))
        }
        other => PlaybackState::from_name(other).map(PlayerSignal::StateChange),
    }
}

fn recognize_generic(object: &Map<String, Value>) -> Option<PlayerSignal> {
    let event = object.get("event").and_then(Value::as_str);
    let kind = object.get("type").and_then(Value::as_str);

    if event == Some("video-progress") || kind == Some("timeupdate") {
        return object
            .get("currentTime")
            .or_else(|| object.get("time"))
            .and_then(seconds)
            .map(PlayerSignal::TimeUpdate);
    }

    if event == Some("video-state") || kind == Some("statechange") {
        return object
            .get("state")
            .and_then(Value::as_str)
            .and_then(PlaybackState::from_name)
            .map(PlayerSignal::StateChange);
    }

    if event == Some("video-error") || kind == Some("error") {
        let message = object
            .get("message")
            .or_else(|| object.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown player error");

        return Some(PlayerSignal::Error(message.to_string()));
    }

    None
}

/// Reads a playback position, rejecting values no player could report.
fn seconds(value: &Value) -> Option<f64> {
    let seconds = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    (seconds.is_finite() && seconds >= 0.).then_some(seconds)
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    const YOUTUBE: &str = "https://www.youtube.com";

    #[test]
    fn test_youtube_messages() {
        let message = RawMessage::text(
            YOUTUBE,
            r#"{"event":"infoDelivery","info":{"currentTime":12.5,"playerState":1}}"#,
        );
        assert_eq!(
            recognize(PlatformKind::YouTube, &message),
            Some(PlayerSignal::TimeUpdate(12.5))
        );

        let message = RawMessage::text(YOUTUBE, r#"{"event":"onStateChange","info":2}"#);
        assert_eq!(
            recognize(PlatformKind::YouTube, &message),
            Some(PlayerSignal::StateChange(PlaybackState::Paused))
        );

        let message = RawMessage::text(YOUTUBE, r#"{"event":"onError","info":150}"#);
        assert_eq!(
            recognize(PlatformKind::YouTube, &message),
            Some(PlayerSignal::Error("YouTube player error 150".to_string()))
        );
    }

    #[test]
    fn test_platform_shapes_require_origin() {
        let message = RawMessage::text(
            "https://somewhere.example",
            r#"{"event":"infoDelivery","info":{"currentTime":12.5}}"#,
        );

        assert_eq!(recognize(PlatformKind::YouTube, &message), None);
    }

    #[test]
    fn test_generic_messages() {
        let message = RawMessage::json(
            "https://teachings.example",
            json!({ "event": "video-progress", "currentTime": 99 }),
        );
        assert_eq!(
            recognize(PlatformKind::Unknown, &message),
            Some(PlayerSignal::TimeUpdate(99.))
        );

        let message = RawMessage::text("", r#"{"type":"timeupdate","currentTime":"4.25"}"#);
        assert_eq!(
            recognize(PlatformKind::Cloudflare, &message),
            Some(PlayerSignal::TimeUpdate(4.25))
        );

        let message = RawMessage::text("", r#"{"type":"statechange","state":"ended"}"#);
        assert_eq!(
            recognize(PlatformKind::Unknown, &message),
            Some(PlayerSignal::StateChange(PlaybackState::Ended))
        );

        let message = RawMessage::text("", r#"{"type":"error","message":"decode failed"}"#);
        assert_eq!(
            recognize(PlatformKind::Unknown, &message),
            Some(PlayerSignal::Error("decode failed".to_string()))
        );
    }

    #[test]
    fn test_vimeo_messages() {
        let message = RawMessage::text(
            "https://player.vimeo.com",
            r#"{"event":"timeupdate","data":{"seconds":7.5,"percent":0.1}}"#,
        );
        assert_eq!(
            recognize(PlatformKind::Vimeo, &message),
            Some(PlayerSignal::TimeUpdate(7.5))
        );

        let message = RawMessage::text("https://player.vimeo.com", r#"{"event":"pause"}"#);
        assert_eq!(
            recognize(PlatformKind::Vimeo, &message),
            Some(PlayerSignal::StateChange(PlaybackState::Paused))
        );
    }

    #[test]
    fn test_malformed_messages_are_ignored() {
        let cases = [
            RawMessage::text(YOUTUBE, "{not json"),
            RawMessage::text(YOUTUBE, "hello"),
            RawMessage::text(YOUTUBE, "[1, 2, 3]"),
            RawMessage::json(YOUTUBE, json!(42)),
            RawMessage::json(YOUTUBE, json!({ "event": "video-progress", "currentTime": -5 })),
            RawMessage::json(YOUTUBE, json!({ "event": "video-progress", "currentTime": "soon" })),
            RawMessage::json(YOUTUBE, json!({ "source": "react-devtools", "payload": {} })),
        ];

        for message in cases {
            assert_eq!(recognize(PlatformKind::YouTube, &message), None, "{:?}", message);
        }
    }
}
