//! Seam to the platform peer-connection and audio backend.
//!
//! Protocol logic never talks to a media stack directly. The peer lifecycle
//! state machine drives a [`MediaEngine`] the same way the server drives its
//! transport: every description, candidate, and audio parameter flows through
//! this trait, so the whole negotiation is testable with a mock engine.

use serde_json::Value;
use thiserror::Error;

use agora_proto::SessionId;

use crate::spatial::AudioParams;

/// Errors from the media backend.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The shared local capture device could not be acquired.
    ///
    /// Voice is an enhancement, not a prerequisite for presence: callers must
    /// scope this failure to the affected peer link.
    #[error("local capture unavailable: {reason}")]
    CaptureUnavailable {
        /// Backend-specific description.
        reason: String,
    },

    /// A description or candidate was rejected by the backend.
    #[error("negotiation failed with {peer}: {reason}")]
    Negotiation {
        /// Peer whose connection failed.
        peer: SessionId,
        /// Backend-specific description.
        reason: String,
    },
}

/// One bidirectional media connection per remote peer, plus the shared local
/// capture.
///
/// Descriptions and candidates are opaque [`Value`]s: they come from and
/// return to the signaling relay verbatim. The local capture device is shared
/// read-only across all peer connections; muting is a single global toggle.
pub trait MediaEngine {
    /// Create an outbound connection for `peer` and produce its local
    /// description.
    fn create_offer(&mut self, peer: SessionId) -> Result<Value, MediaError>;

    /// Create an inbound connection for `peer`, apply the remote offer, and
    /// produce the local answer.
    fn create_answer(&mut self, peer: SessionId, offer: &Value) -> Result<Value, MediaError>;

    /// Apply a received answer as the remote description of `peer`'s
    /// connection.
    fn apply_answer(&mut self, peer: SessionId, answer: &Value) -> Result<(), MediaError>;

    /// Apply a received network-path candidate to `peer`'s connection.
    ///
    /// Callers guarantee the remote description is already set; candidates
    /// that arrive earlier are buffered by the peer lifecycle.
    fn add_candidate(&mut self, peer: SessionId, candidate: &Value) -> Result<(), MediaError>;

    /// Wire `peer`'s inbound audio into the output graph with initial
    /// parameters. Called once, on first received remote media.
    fn attach_audio(&mut self, peer: SessionId, params: AudioParams);

    /// Update `peer`'s audio parameters. Called on every re-evaluation while
    /// connected.
    fn set_audio(&mut self, peer: SessionId, params: AudioParams);

    /// Toggle the shared local capture. Applies to all peer connections.
    fn set_muted(&mut self, muted: bool);

    /// Release `peer`'s connection and audio resources. Idempotent.
    fn close(&mut self, peer: SessionId);
}
