mod id;

pub use id::*;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use url::Url;

lazy_static! {
    /// Matches a missing or plain-http scheme at the start of a url.
    pub static ref URL_SCHEME_REGEX: Regex = Regex::new(r"^(?i:https?://)?").unwrap();
}

/// Parses a url that may be missing its scheme, like `youtu.be/abc`.
pub fn parse_lenient_url(input: &str) -> Option<Url> {
    let normalized = URL_SCHEME_REGEX.replace(input.trim(), "https://");
    Url::parse(&normalized).ok()
}

/// Deserializes an id that may be a number or a string into a string.
/// Ids come as numbers from the API and as strings from the CMS.
pub fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Number(u64),
        Text(String),
    }

    Ok(match Key::deserialize(deserializer)? {
        Key::Number(n) => n.to_string(),
        Key::Text(s) => s,
    })
}
