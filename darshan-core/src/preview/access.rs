use serde::Serialize;

use crate::{AccessType, Config, Teaching, ViewContext, ViewerSession};

/// The outcome of an access decision for a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Block,
}

impl Verdict {
    pub fn is_block(&self) -> bool {
        matches!(self, Verdict::Block)
    }
}

impl From<bool> for Verdict {
    fn from(block: bool) -> Self {
        if block {
            Verdict::Block
        } else {
            Verdict::Allow
        }
    }
}

/// Decides whether playback has to be blocked.
///
/// Authentication dominates everything else, so it is checked before elapsed time is looked at.
/// Membership tiers are not consulted here: the API leaves out what a tier can't see, and this
/// check only backs that up.
pub fn should_block(
    is_authenticated: bool,
    access_type: AccessType,
    current_time: f64,
    preview_budget: f64,
) -> bool {
    if is_authenticated {
        return false;
    }

    match access_type {
        AccessType::Restricted => true,
        AccessType::Free => current_time >= preview_budget,
    }
}

/// Same as [should_block], reading authentication from the injected session.
pub fn decide(
    session: &ViewerSession,
    access_type: AccessType,
    current_time: f64,
    preview_budget: f64,
) -> Verdict {
    should_block(
        session.is_authenticated,
        access_type,
        current_time,
        preview_budget,
    )
    .into()
}

/// Returns how many seconds of the teaching may be watched in the given context.
/// Teachings without a budget get the configured default.
pub fn preview_budget(teaching: &Teaching, context: ViewContext, config: &Config) -> f64 {
    config.budget_or_default(teaching.preview_budget(context))
}
