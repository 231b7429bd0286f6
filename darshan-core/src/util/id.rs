use std::fmt::Display;

use crossbeam::atomic::AtomicCell;
use serde::Serialize;

static NEXT_ADAPTER_ID: AtomicCell<u64> = AtomicCell::new(1);

/// Identifies one binding of an adapter to an embed.
///
/// Every bind takes a fresh id, so events from a player that was switched away from can be told
/// apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AdapterId(u64);

impl AdapterId {
    pub fn next() -> Self {
        Self(NEXT_ADAPTER_ID.fetch_add(1))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for AdapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "adapter #{}", self.0)
    }
}
