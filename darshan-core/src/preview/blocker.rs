use serde::Serialize;

/// How the overlay sits over the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    /// The player was silenced and stays mounted underneath.
    Cover,
    /// The player can't be controlled, so it is unmounted and the overlay takes its place.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallToAction {
    pub sign_up_url: String,
    pub sign_in_url: String,
}

/// What is shown once a viewer has been blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlay {
    pub thumbnail: Option<String>,
    pub headline: String,
    pub call_to_action: CallToAction,
    pub presentation: Presentation,
}

/// Holds the overlay for a mounted player. Raising it more than once has no effect.
#[derive(Debug, Default)]
pub struct Blocker {
    overlay: Option<Overlay>,
}

impl Blocker {
    /// Shows the overlay. Returns false if it was already shown.
    pub fn raise(&mut self, overlay: Overlay) -> bool {
        if self.overlay.is_some() {
            return false;
        }

        self.overlay = Some(overlay);
        true
    }

    pub fn is_blocked(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Returns true if the player should no longer be rendered.
    pub fn hides_player(&self) -> bool {
        matches!(
            self.overlay,
            Some(Overlay {
                presentation: Presentation::Replace,
                ..
            })
        )
    }

    /// Removes the overlay, returning it if it was shown.
    pub fn clear(&mut self) -> Option<Overlay> {
        self.overlay.take()
    }
}
