use lazy_static::lazy_static;
use regex::Regex;

use super::PlatformKind;

lazy_static! {
    static ref YOUTUBE_REGEX: Regex = Regex::new(
        r"(?i)(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|v/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})"
    )
    .unwrap();
    static ref CLOUDFLARE_REGEX: Regex =
        Regex::new(r"(?i)(?:videodelivery\.net|cloudflarestream\.com)/([A-Za-z0-9]+)").unwrap();
    static ref VIMEO_REGEX: Regex = Regex::new(
        r"(?i)vimeo\.com/(?:video/|channels/[^/]+/|groups/[^/]+/videos/)?(\d+)"
    )
    .unwrap();
    static ref RUMBLE_REGEX: Regex =
        Regex::new(r"(?i)rumble\.com/(?:embed/)?(v[A-Za-z0-9]+)").unwrap();
}

/// Extracts the vendor id of a video from its url.
///
/// Returns `None` if the url doesn't carry an id we recognize, which callers should treat as
/// "this asset cannot be controlled" rather than an error.
pub fn extract_video_id(url: &str, platform: PlatformKind) -> Option<String> {
    let regex: &Regex = match platform {
        PlatformKind::YouTube => &YOUTUBE_REGEX,
        PlatformKind::Cloudflare => &CLOUDFLARE_REGEX,
        PlatformKind::Vimeo => &VIMEO_REGEX,
        PlatformKind::Rumble => &RUMBLE_REGEX,
        PlatformKind::Unknown => return None,
    };

    regex
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
