//! Peer Lifecycle Manager
//!
//! One [`PeerLink`] per remote participant, owning the negotiation state of
//! one bidirectional media connection:
//!
//! ```text
//! Offering ──(answer applied, transport connects)──► Connected
//! AwaitingAnswer ──(transport connects)───────────► Connected
//!     any state ──(teardown / failure / remote left)──► Closed
//! ```
//!
//! `Offering` means we sent the offer and wait for the answer;
//! `AwaitingAnswer` means we answered an inbound offer and wait for the
//! transport to connect. Candidates may arrive before the remote description
//! is set (the relay gives no ordering guarantee); they are buffered and
//! flushed once it exists, never dropped.

use agora_core::{
    media::{MediaEngine, MediaError},
    spatial::AudioParams,
};
use agora_proto::{ClientMessage, SessionId};
use serde_json::Value;

/// Negotiation state of one peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerLinkState {
    /// Offer sent; waiting for the answer.
    Offering,
    /// Inbound offer answered; waiting for the transport to connect.
    AwaitingAnswer,
    /// Transport reports connected; media is flowing.
    Connected,
    /// Torn down. Terminal; resources are released.
    Closed,
}

/// Client-local record of one peer-to-peer media connection's lifecycle.
#[derive(Debug)]
pub struct PeerLink {
    target: SessionId,
    state: PeerLinkState,
    remote_description_set: bool,
    pending_candidates: Vec<Value>,
    audio_attached: bool,
    audio: AudioParams,
}

impl PeerLink {
    /// Initiate an outbound connection: create the local description and
    /// return the link plus the offer to relay.
    pub fn offer(
        target: SessionId,
        audio: AudioParams,
        media: &mut impl MediaEngine,
    ) -> Result<(Self, ClientMessage), MediaError> {
        let description = media.create_offer(target)?;
        let link = Self {
            target,
            state: PeerLinkState::Offering,
            remote_description_set: false,
            pending_candidates: Vec::new(),
            audio_attached: false,
            audio,
        };
        Ok((link, ClientMessage::SignalOffer { target_id: target, description }))
    }

    /// Accept an inbound offer: create the connection, apply the remote
    /// description, and return the link plus the answer to relay.
    pub fn answer(
        target: SessionId,
        offer: &Value,
        audio: AudioParams,
        media: &mut impl MediaEngine,
    ) -> Result<(Self, ClientMessage), MediaError> {
        let description = media.create_answer(target, offer)?;
        let link = Self {
            target,
            state: PeerLinkState::AwaitingAnswer,
            remote_description_set: true,
            pending_candidates: Vec::new(),
            audio_attached: false,
            audio,
        };
        Ok((link, ClientMessage::SignalAnswer { target_id: target, description }))
    }

    /// The remote participant this link connects to.
    pub fn target(&self) -> SessionId {
        self.target
    }

    /// Current negotiation state.
    pub fn state(&self) -> PeerLinkState {
        self.state
    }

    /// Apply a received answer as the remote description and flush any
    /// buffered candidates.
    ///
    /// Only meaningful while `Offering`; in any other state the answer is a
    /// duplicate or out-of-order relay artifact and is dropped.
    pub fn apply_answer(
        &mut self,
        answer: &Value,
        media: &mut impl MediaEngine,
    ) -> Result<(), MediaError> {
        if self.state != PeerLinkState::Offering || self.remote_description_set {
            tracing::debug!(target = self.target, state = ?self.state, "ignoring unexpected answer");
            return Ok(());
        }
        media.apply_answer(self.target, answer)?;
        self.remote_description_set = true;
        for candidate in std::mem::take(&mut self.pending_candidates) {
            media.add_candidate(self.target, &candidate)?;
        }
        Ok(())
    }

    /// Apply a received candidate, or buffer it until the remote description
    /// exists.
    pub fn add_candidate(
        &mut self,
        candidate: Value,
        media: &mut impl MediaEngine,
    ) -> Result<(), MediaError> {
        if self.state == PeerLinkState::Closed {
            return Ok(());
        }
        if self.remote_description_set {
            media.add_candidate(self.target, &candidate)
        } else {
            self.pending_candidates.push(candidate);
            Ok(())
        }
    }

    /// The transport reported connected.
    pub fn transport_connected(&mut self) {
        if self.state != PeerLinkState::Closed {
            self.state = PeerLinkState::Connected;
        }
    }

    /// First remote media arrived: wire the peer's audio into the output
    /// graph with the most recent spatial parameters. Idempotent.
    pub fn remote_media(&mut self, media: &mut impl MediaEngine) {
        if self.state == PeerLinkState::Closed || self.audio_attached {
            return;
        }
        media.attach_audio(self.target, self.audio);
        self.audio_attached = true;
    }

    /// Store freshly computed spatial parameters and, if audio is live, push
    /// them to the backend.
    pub fn set_audio_params(&mut self, params: AudioParams, media: &mut impl MediaEngine) {
        self.audio = params;
        if self.state == PeerLinkState::Connected && self.audio_attached {
            media.set_audio(self.target, params);
        }
    }

    /// Tear down from any state: release the connection and audio resources.
    ///
    /// Returns `false` if the link was already closed.
    pub fn close(&mut self, media: &mut impl MediaEngine) -> bool {
        if self.state == PeerLinkState::Closed {
            return false;
        }
        media.close(self.target);
        self.pending_candidates.clear();
        self.audio_attached = false;
        self.state = PeerLinkState::Closed;
        true
    }
}
