mod access;
mod blocker;
mod clock;

pub use access::*;
pub use blocker::*;
pub use clock::*;

use crate::{AccessType, ViewerSession};

/// Ephemeral state of a mounted player: how long it was watched, and whether it was blocked.
#[derive(Debug)]
pub struct PreviewState {
    pub clock: PreviewClock,
    pub blocker: Blocker,
}

impl PreviewState {
    pub fn new(budget: f64) -> Self {
        Self {
            clock: PreviewClock::new(budget),
            blocker: Blocker::default(),
        }
    }

    /// Records a sample and decides on it.
    pub fn sample(
        &mut self,
        current_time: f64,
        session: &ViewerSession,
        access_type: AccessType,
    ) -> Verdict {
        let elapsed = self.clock.sample(current_time);
        decide(session, access_type, elapsed, self.clock.budget())
    }

    /// Decides without a new sample, e.g. right after mounting.
    pub fn evaluate(&self, session: &ViewerSession, access_type: AccessType) -> Verdict {
        decide(
            session,
            access_type,
            self.clock.elapsed(),
            self.clock.budget(),
        )
    }

    pub fn is_blocked(&self) -> bool {
        self.blocker.is_blocked()
    }

    /// Starts over, as if the player was just mounted.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.blocker.clear();
    }
}
