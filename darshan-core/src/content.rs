use serde::{Deserialize, Serialize};

use crate::deserialize_key;

/// How the teaching is presented.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(from = "String")]
pub enum ContentType {
    Video,
    Audio,
    #[default]
    Text,
    Essay,
}

/// Server computed classification of a teaching for the current viewer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    #[default]
    Free,
    /// Membership only
    Restricted,
}

/// The membership a viewer holds, ordered from lowest to highest.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(from = "String")]
pub enum MembershipTier {
    #[default]
    Free,
    Gyani,
    Pragyani,
}

/// Where a teaching is being viewed, which decides the preview budget.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewContext {
    #[default]
    Public,
    Dashboard,
}

/// A reference to an externally hosted piece of media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MediaSource {
    YouTube(String),
    Cloudflare(String),
    Podbean(String),
    /// A direct embed url for any other host.
    Url(String),
}

/// A content item, as the engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TeachingPayload")]
pub struct Teaching {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub content_type: ContentType,
    /// Selectable video sources, the first one is the primary source.
    pub video_sources: Vec<MediaSource>,
    /// Audio renditions, shown in the audio tab.
    pub audio_sources: Vec<MediaSource>,
    /// Seconds a signed-out viewer may watch on public pages. Missing means the configured default.
    pub preview_duration: Option<f64>,
    /// Seconds a viewer may watch inside the member dashboard, when it differs from the public budget.
    pub dashboard_preview_duration: Option<f64>,
    pub access_type: AccessType,
    pub comments_enabled: bool,
}

/// The short form of a teaching, used in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingSummary {
    #[serde(deserialize_with = "deserialize_key")]
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub content_type: ContentType,
}

/// Ambient state about who is watching. Never mutated by the engine.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerSession {
    pub is_authenticated: bool,
    #[serde(default)]
    pub membership_tier: MembershipTier,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// The teaching as it arrives from the API.
#[derive(Debug, Deserialize)]
struct TeachingPayload {
    #[serde(deserialize_with = "deserialize_key")]
    id: String,
    slug: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "featured_image")]
    thumbnail: Option<String>,
    #[serde(default)]
    content_type: ContentType,
    #[serde(default)]
    youtube_ids: Vec<String>,
    #[serde(default)]
    cloudflare_ids: Vec<String>,
    #[serde(default)]
    podbean_ids: Vec<String>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    preview_duration: Option<f64>,
    #[serde(default)]
    dashboard_preview_duration: Option<f64>,
    #[serde(default)]
    access_type: Option<AccessType>,
    #[serde(default)]
    can_access: Option<bool>,
    #[serde(default)]
    comments_enabled: Option<bool>,
}

impl Teaching {
    /// The sources a player can be mounted against.
    /// Falls back to audio when a teaching has no video.
    pub fn playable_sources(&self) -> &[MediaSource] {
        if self.video_sources.is_empty() {
            &self.audio_sources
        } else {
            &self.video_sources
        }
    }

    /// Returns the first playable source, if any.
    pub fn primary_source(&self) -> Option<&MediaSource> {
        self.playable_sources().first()
    }

    /// Returns the budget the teaching sets for the given context, if it sets one.
    pub fn preview_budget(&self, context: ViewContext) -> Option<f64> {
        match context {
            ViewContext::Public => self.preview_duration,
            ViewContext::Dashboard => self.dashboard_preview_duration.or(self.preview_duration),
        }
    }

    pub fn summary(&self) -> TeachingSummary {
        TeachingSummary {
            id: self.id.clone(),
            slug: self.slug.clone(),
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            content_type: self.content_type,
        }
    }
}

impl MediaSource {
    /// Returns the url the embed should load for this source.
    pub fn embed_url(&self) -> String {
        match self {
            MediaSource::YouTube(id) => {
                format!("https://www.youtube.com/embed/{}?enablejsapi=1", id)
            }
            MediaSource::Cloudflare(id) => format!("https://iframe.videodelivery.net/{}", id),
            MediaSource::Podbean(id) => format!(
                "https://www.podbean.com/player-v2/?i={}&share=1&download=0",
                id
            ),
            MediaSource::Url(url) => url.clone(),
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, MediaSource::Podbean(_))
    }
}

impl ViewerSession {
    /// A signed-out viewer.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in viewer with the given tier and token.
    pub fn authenticated(membership_tier: MembershipTier, access_token: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            membership_tier,
            access_token: Some(access_token.into()),
        }
    }
}

impl From<TeachingPayload> for Teaching {
    fn from(payload: TeachingPayload) -> Self {
        let video_sources = payload
            .youtube_ids
            .into_iter()
            .map(MediaSource::YouTube)
            .chain(payload.cloudflare_ids.into_iter().map(MediaSource::Cloudflare))
            .chain(payload.video_url.into_iter().map(MediaSource::Url))
            .filter(|s| !s.is_blank())
            .collect();

        let audio_sources = payload
            .podbean_ids
            .into_iter()
            .map(MediaSource::Podbean)
            .filter(|s| !s.is_blank())
            .collect();

        // An explicit access type always wins over the viewer flag.
        let access_type = payload
            .access_type
            .unwrap_or(match payload.can_access {
                Some(false) => AccessType::Restricted,
                _ => AccessType::Free,
            });

        Self {
            id: payload.id,
            slug: payload.slug,
            title: payload.title,
            description: payload.description,
            thumbnail: payload.thumbnail,
            content_type: payload.content_type,
            video_sources,
            audio_sources,
            preview_duration: payload.preview_duration,
            dashboard_preview_duration: payload.dashboard_preview_duration,
            access_type,
            comments_enabled: payload.comments_enabled.unwrap_or(true),
        }
    }
}

impl MediaSource {
    fn is_blank(&self) -> bool {
        match self {
            MediaSource::YouTube(v)
            | MediaSource::Cloudflare(v)
            | MediaSource::Podbean(v)
            | MediaSource::Url(v) => v.trim().is_empty(),
        }
    }
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "essay" => Self::Essay,
            _ => Self::Text,
        }
    }
}

impl From<String> for MembershipTier {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "GYANI" => Self::Gyani,
            "PRAGYANI" => Self::Pragyani,
            _ => Self::Free,
        }
    }
}
