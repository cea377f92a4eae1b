//! Client Position Tracker
//!
//! Maintains a coherent view of "where is everyone, right now": one
//! authoritative local position plus the last-reported position of every
//! remote participant. Consumed by the rendering layer (external) and the
//! proximity manager (one snapshot per evaluation).
//!
//! The view is eventually consistent, as fresh as the last received event;
//! there is no staleness bound.

use std::collections::HashMap;

use agora_proto::{Position, SessionId};

/// Read-only view over the tracker, taken once per evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// The local participant's position, absent until the first local move.
    pub local: Option<Position>,
    /// Last-reported positions of remote participants.
    pub remotes: &'a HashMap<SessionId, Position>,
}

/// Positions of the local participant and all known remotes.
#[derive(Debug, Default)]
pub struct PositionTracker {
    local: Option<Position>,
    remotes: HashMap<SessionId, Position>,
}

impl PositionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed local move.
    pub fn set_local(&mut self, position: Position) {
        self.local = Some(position);
    }

    /// Record or update a remote participant's last-known position.
    pub fn set_remote(&mut self, session_id: SessionId, position: Position) {
        self.remotes.insert(session_id, position);
    }

    /// Drop a remote participant's tracked position (on departure).
    pub fn remove_remote(&mut self, session_id: SessionId) {
        self.remotes.remove(&session_id);
    }

    /// Current view of local and remote positions.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot { local: self.local, remotes: &self.remotes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_latest_updates() {
        let mut tracker = PositionTracker::new();
        assert!(tracker.snapshot().local.is_none());

        tracker.set_local(Position::new(1.0, 2.0));
        tracker.set_remote(7, Position::new(3.0, 4.0));
        tracker.set_remote(7, Position::new(5.0, 6.0));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.local, Some(Position::new(1.0, 2.0)));
        assert_eq!(snapshot.remotes.get(&7), Some(&Position::new(5.0, 6.0)));
    }

    #[test]
    fn removed_remote_disappears() {
        let mut tracker = PositionTracker::new();
        tracker.set_remote(7, Position::new(0.0, 0.0));
        tracker.remove_remote(7);
        assert!(tracker.snapshot().remotes.is_empty());
    }
}
