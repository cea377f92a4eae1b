//! Proximity Connection Manager
//!
//! Translates spatial proximity into the set of peer links that should
//! exist. Every position change (local or remote) triggers an evaluation:
//! peers at distance ≤ the hearing range get a link opened, peers beyond it
//! get their link torn down, and already-connected peers get fresh
//! `(gain, pan)` pushed from the spatial mapper.
//!
//! The threshold is a single value with no hysteresis: open and continue at
//! `≤ range`, close at `> range`. A peer sitting exactly on the boundary can
//! flap under jitter; that is the accepted default behavior.

use std::collections::HashMap;

use agora_core::{
    media::{MediaEngine, MediaError},
    spatial::{AudioParams, SpatialConfig},
};
use agora_proto::SessionId;
use serde_json::Value;

use crate::{
    event::{ClientAction, PeerTransportState},
    peer::{PeerLink, PeerLinkState},
    tracker::Snapshot,
};

/// Tunables for proximity evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ProximityConfig {
    /// Distance at or under which a voice link is opened.
    pub hearing_range: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self { hearing_range: 150.0 }
    }
}

/// Decides which peer links exist and keeps their audio parameters current.
pub struct ProximityManager {
    config: ProximityConfig,
    spatial: SpatialConfig,
    links: HashMap<SessionId, PeerLink>,
}

impl ProximityManager {
    /// Create a manager with the given tunables.
    pub fn new(config: ProximityConfig, spatial: SpatialConfig) -> Self {
        Self { config, spatial, links: HashMap::new() }
    }

    /// Negotiation state of the link to `peer`, if one exists.
    pub fn link_state(&self, peer: SessionId) -> Option<PeerLinkState> {
        self.links.get(&peer).map(PeerLink::state)
    }

    /// Number of live links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Spatial parameters for a peer at `position` as heard from `local`.
    pub fn audio_params_for(
        &self,
        local: agora_proto::Position,
        position: agora_proto::Position,
    ) -> AudioParams {
        self.spatial.map(local.distance_to(position), local.bearing_to(position))
    }

    /// Re-evaluate the whole connection set against a fresh snapshot.
    ///
    /// Idempotent for an unchanged snapshot: existing links are left alone
    /// (audio refresh aside), missing ones are opened, out-of-range ones are
    /// closed. Does nothing until the local position is known.
    pub fn evaluate(
        &mut self,
        snapshot: Snapshot<'_>,
        media: &mut impl MediaEngine,
    ) -> Vec<ClientAction> {
        let Some(local) = snapshot.local else {
            return vec![];
        };

        let mut actions = Vec::new();

        for (&peer, &position) in snapshot.remotes {
            let distance = local.distance_to(position);
            if distance > self.config.hearing_range {
                continue;
            }
            let params = self.spatial.map(distance, local.bearing_to(position));
            if let Some(link) = self.links.get_mut(&peer) {
                link.set_audio_params(params, media);
            } else {
                match PeerLink::offer(peer, params, media) {
                    Ok((link, signal)) => {
                        tracing::debug!(peer, distance, "opening voice link");
                        self.links.insert(peer, link);
                        actions.push(ClientAction::Send(signal));
                    },
                    Err(e) => actions.extend(self.media_failure(peer, &e)),
                }
            }
        }

        let out_of_range: Vec<SessionId> = self
            .links
            .keys()
            .copied()
            .filter(|peer| match snapshot.remotes.get(peer) {
                Some(&position) => local.distance_to(position) > self.config.hearing_range,
                None => true,
            })
            .collect();
        for peer in out_of_range {
            tracing::debug!(peer, "closing out-of-range voice link");
            actions.extend(self.close_link(peer, media));
        }

        actions
    }

    /// An offer arrived from `from`.
    ///
    /// Glare: if we are already `Offering` toward the same peer, the side
    /// with the lower session id wins the race. The loser abandons its own
    /// offer and answers; the winner ignores the competing offer and keeps
    /// waiting for its answer. While `AwaitingAnswer` or `Connected`, further
    /// offers are duplicates and are dropped.
    pub fn on_offer(
        &mut self,
        self_id: SessionId,
        from: SessionId,
        description: &Value,
        audio: AudioParams,
        media: &mut impl MediaEngine,
    ) -> Vec<ClientAction> {
        let mut actions = Vec::new();

        if let Some(link) = self.links.get_mut(&from) {
            match link.state() {
                PeerLinkState::Offering if from < self_id => {
                    tracing::debug!(peer = from, "glare: yielding to peer's offer");
                    link.close(media);
                    self.links.remove(&from);
                },
                PeerLinkState::Offering => {
                    tracing::debug!(peer = from, "glare: keeping own offer");
                    return actions;
                },
                _ => {
                    tracing::debug!(peer = from, state = ?link.state(), "dropping duplicate offer");
                    return actions;
                },
            }
        }

        match PeerLink::answer(from, description, audio, media) {
            Ok((link, signal)) => {
                tracing::debug!(peer = from, "answering inbound offer");
                self.links.insert(from, link);
                actions.push(ClientAction::Send(signal));
            },
            Err(e) => actions.extend(self.media_failure(from, &e)),
        }
        actions
    }

    /// An answer arrived from `from`.
    pub fn on_answer(
        &mut self,
        from: SessionId,
        description: &Value,
        media: &mut impl MediaEngine,
    ) -> Vec<ClientAction> {
        let Some(link) = self.links.get_mut(&from) else {
            tracing::debug!(peer = from, "dropping answer without link");
            return vec![];
        };
        if let Err(e) = link.apply_answer(description, media) {
            tracing::warn!(peer = from, error = %e, "answer failed, closing link");
            return self.close_link(from, media);
        }
        vec![]
    }

    /// A candidate arrived from `from`. Buffered by the link if the remote
    /// description is not set yet.
    pub fn on_candidate(
        &mut self,
        from: SessionId,
        candidate: Value,
        media: &mut impl MediaEngine,
    ) -> Vec<ClientAction> {
        let Some(link) = self.links.get_mut(&from) else {
            tracing::debug!(peer = from, "dropping candidate without link");
            return vec![];
        };
        if let Err(e) = link.add_candidate(candidate, media) {
            tracing::warn!(peer = from, error = %e, "candidate failed, closing link");
            return self.close_link(from, media);
        }
        vec![]
    }

    /// The media transport reported a state change for `peer`.
    pub fn on_transport_state(
        &mut self,
        peer: SessionId,
        state: PeerTransportState,
        media: &mut impl MediaEngine,
    ) -> Vec<ClientAction> {
        match state {
            PeerTransportState::Connected => match self.links.get_mut(&peer) {
                Some(link) => {
                    link.transport_connected();
                    vec![ClientAction::PeerConnected { peer }]
                },
                None => {
                    tracing::debug!(peer, "transport connected without link");
                    vec![]
                },
            },
            PeerTransportState::Failed | PeerTransportState::Closed => {
                self.close_link(peer, media)
            },
        }
    }

    /// First remote media arrived for `peer`: attach its audio.
    pub fn on_remote_media(&mut self, peer: SessionId, media: &mut impl MediaEngine) {
        if let Some(link) = self.links.get_mut(&peer) {
            link.remote_media(media);
        }
    }

    /// A participant disconnected from the space.
    pub fn on_peer_left(
        &mut self,
        peer: SessionId,
        media: &mut impl MediaEngine,
    ) -> Vec<ClientAction> {
        self.close_link(peer, media)
    }

    /// Tear down and forget the link to `peer`, if any.
    fn close_link(&mut self, peer: SessionId, media: &mut impl MediaEngine) -> Vec<ClientAction> {
        match self.links.remove(&peer) {
            Some(mut link) => {
                link.close(media);
                vec![ClientAction::PeerDisconnected { peer }]
            },
            None => vec![],
        }
    }

    /// Scope a media failure to the affected peer. Capture problems are
    /// surfaced to the display layer; negotiation problems are logged and
    /// left for the next evaluation to retry.
    fn media_failure(&self, peer: SessionId, error: &MediaError) -> Vec<ClientAction> {
        match error {
            MediaError::CaptureUnavailable { .. } => {
                tracing::warn!(peer, error = %error, "voice unavailable");
                vec![ClientAction::MediaUnavailable { reason: error.to_string() }]
            },
            MediaError::Negotiation { .. } => {
                tracing::warn!(peer, error = %error, "negotiation failed");
                vec![]
            },
        }
    }
}
