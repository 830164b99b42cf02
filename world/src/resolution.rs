//! Removals deferred until every update phase of a tick has run.

use path_defence_core::{BulletId, EnemyId};

/// Removal recorded during an update phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The enemy walked off the final waypoint.
    ReachedEnd(EnemyId),
    /// The bullet brought its target to zero health.
    Killed { bullet: BulletId, enemy: EnemyId },
    /// The bullet hit without killing, or lost its target.
    Spent(BulletId),
}

/// Ordered queue of removals awaiting the event application phase.
#[derive(Debug, Default)]
pub(crate) struct ResolutionQueue {
    pending: Vec<Resolution>,
}

impl ResolutionQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, resolution: Resolution) {
        self.pending.push(resolution);
    }

    /// Takes every queued removal in the order it was recorded.
    pub(crate) fn take(&mut self) -> Vec<Resolution> {
        std::mem::take(&mut self.pending)
    }
}
