use std::collections::VecDeque;

use crate::PlatformKind;

use super::{recognize, PlayerSignal, RawMessage};

/// Messages received for a player, waiting to be recognized.
#[derive(Debug, Default)]
pub struct InboundQueue {
    pending: VecDeque<RawMessage>,
    /// How many messages didn't match any known shape.
    ignored: usize,
}

impl InboundQueue {
    pub fn push(&mut self, message: RawMessage) {
        self.pending.push_back(message);
    }

    /// Recognizes every pending message and returns the signals in arrival order.
    pub fn drain(&mut self, platform: PlatformKind) -> Vec<PlayerSignal> {
        let mut signals = Vec::with_capacity(self.pending.len());

        for message in self.pending.drain(..) {
            match recognize(platform, &message) {
                Some(signal) => signals.push(signal),
                None => self.ignored += 1,
            }
        }

        signals
    }

    /// Drops pending messages, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let amount = self.pending.len();
        self.pending.clear();
        amount
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }
}
