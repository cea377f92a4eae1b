//! Shared mock media backend for client tests.

// Each test binary uses a different subset of the recorder.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use agora_core::{
    media::{MediaEngine, MediaError},
    spatial::AudioParams,
};
use agora_proto::SessionId;
use serde_json::{Value, json};

/// Recording media backend with failure injection.
#[derive(Default)]
pub struct MockMedia {
    /// When set, offer/answer creation fails as if capture were unavailable.
    pub fail_capture: bool,
    /// Peers with an open connection.
    pub open: HashSet<SessionId>,
    /// Peers offered to, in order.
    pub offers: Vec<SessionId>,
    /// Peers answered, in order.
    pub answers: Vec<SessionId>,
    /// Candidates applied, in order.
    pub candidates: Vec<(SessionId, Value)>,
    /// Audio attach parameters per peer.
    pub attached: HashMap<SessionId, AudioParams>,
    /// Latest pushed audio parameters per peer.
    pub audio: HashMap<SessionId, AudioParams>,
    /// Peers closed, in order (repeats allowed).
    pub closed: Vec<SessionId>,
    /// Capture mute state.
    pub muted: bool,
}

impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_capture() -> Self {
        Self { fail_capture: true, ..Self::default() }
    }
}

impl MediaEngine for MockMedia {
    fn create_offer(&mut self, peer: SessionId) -> Result<Value, MediaError> {
        if self.fail_capture {
            return Err(MediaError::CaptureUnavailable { reason: "no microphone".into() });
        }
        self.open.insert(peer);
        self.offers.push(peer);
        Ok(json!({"kind": "offer", "for": peer}))
    }

    fn create_answer(&mut self, peer: SessionId, _offer: &Value) -> Result<Value, MediaError> {
        if self.fail_capture {
            return Err(MediaError::CaptureUnavailable { reason: "no microphone".into() });
        }
        self.open.insert(peer);
        self.answers.push(peer);
        Ok(json!({"kind": "answer", "for": peer}))
    }

    fn apply_answer(&mut self, _peer: SessionId, _answer: &Value) -> Result<(), MediaError> {
        Ok(())
    }

    fn add_candidate(&mut self, peer: SessionId, candidate: &Value) -> Result<(), MediaError> {
        self.candidates.push((peer, candidate.clone()));
        Ok(())
    }

    fn attach_audio(&mut self, peer: SessionId, params: AudioParams) {
        self.attached.insert(peer, params);
    }

    fn set_audio(&mut self, peer: SessionId, params: AudioParams) {
        self.audio.insert(peer, params);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn close(&mut self, peer: SessionId) {
        self.open.remove(&peer);
        self.closed.push(peer);
    }
}
