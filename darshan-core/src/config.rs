/// The configuration of the preview engine
#[derive(Debug, Clone)]
pub struct Config {
    /// How many seconds a signed-out viewer may watch when a teaching doesn't specify a budget
    pub default_preview_in_seconds: f64,
    /// Headline shown on the blocker overlay
    pub blocker_headline: String,
    /// Where the overlay sends viewers to create an account
    pub sign_up_url: String,
    /// Where the overlay sends viewers that already have an account
    pub sign_in_url: String,
    /// Whether the player should be paused (instead of stopped) when blocked
    pub pause_on_block: bool,
}

impl Config {
    /// The budget used when a teaching payload has none
    pub const DEFAULT_PREVIEW_IN_SECONDS: f64 = 300.;

    /// Returns the budget to use, falling back to the default if the given one is missing.
    pub fn budget_or_default(&self, budget: Option<f64>) -> f64 {
        budget.unwrap_or(self.default_preview_in_seconds)
    }

    /// Returns the sign up url with a redirect back to the given path.
    pub fn sign_up_url_for(&self, return_to: &str) -> String {
        with_redirect(&self.sign_up_url, return_to)
    }

    /// Returns the sign in url with a redirect back to the given path.
    pub fn sign_in_url_for(&self, return_to: &str) -> String {
        with_redirect(&self.sign_in_url, return_to)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Five minutes is enough to get a feel for a teaching
            default_preview_in_seconds: Self::DEFAULT_PREVIEW_IN_SECONDS,
            blocker_headline: "Sign up to continue watching".to_string(),
            sign_up_url: "/signup".to_string(),
            sign_in_url: "/login".to_string(),
            pause_on_block: false,
        }
    }
}

fn with_redirect(base: &str, return_to: &str) -> String {
    if return_to.is_empty() {
        return base.to_string();
    }

    let separator = if base.contains('?') { '&' } else { '?' };
    let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();

    format!("{base}{separator}redirect={encoded}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_redirect_urls() {
        let config = Config::default();

        assert_eq!(
            config.sign_up_url_for("/teachings/the-heart-sutra"),
            "/signup?redirect=%2Fteachings%2Fthe-heart-sutra"
        );
        assert_eq!(config.sign_in_url_for(""), "/login");

        let config = Config {
            sign_in_url: "/login?source=preview".to_string(),
            ..Default::default()
        };

        assert_eq!(
            config.sign_in_url_for("/a"),
            "/login?source=preview&redirect=%2Fa"
        );
    }

    #[test]
    fn test_budget_fallback() {
        let config = Config::default();

        assert_eq!(config.budget_or_default(None), 300.);
        assert_eq!(config.budget_or_default(Some(42.)), 42.);
    }
}
