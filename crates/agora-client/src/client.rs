//! Client state machine.
//!
//! The `Client` is the top-level dispatcher tying the position tracker and
//! the proximity manager together. Pure state machine: the transport driver
//! feeds it events, it returns actions, and all media work goes through the
//! [`MediaEngine`] passed into each call.
//!
//! `handle` takes `&mut self`, so evaluations can never run concurrently
//! with themselves; a burst of position events is processed one snapshot at
//! a time, each seeing the freshest state.

use std::collections::HashMap;

use agora_core::{
    media::MediaEngine,
    spatial::{AudioParams, SpatialConfig},
};
use agora_proto::{ClientMessage, Position, ServerMessage, SessionId};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent},
    proximity::{ProximityConfig, ProximityManager},
    tracker::PositionTracker,
};

/// Client-side presence core for one participant.
pub struct Client {
    /// Our session id, known after the welcome.
    self_id: Option<SessionId>,
    /// Display names of known participants.
    names: HashMap<SessionId, String>,
    /// Local and remote positions.
    tracker: PositionTracker,
    /// The voice link mesh.
    proximity: ProximityManager,
}

impl Client {
    /// Create a client with the given tunables.
    pub fn new(proximity: ProximityConfig, spatial: SpatialConfig) -> Self {
        Self {
            self_id: None,
            names: HashMap::new(),
            tracker: PositionTracker::new(),
            proximity: ProximityManager::new(proximity, spatial),
        }
    }

    /// Our session id, once the server has welcomed us.
    pub fn self_id(&self) -> Option<SessionId> {
        self.self_id
    }

    /// Number of live voice links.
    pub fn link_count(&self) -> usize {
        self.proximity.link_count()
    }

    /// Negotiation state of the link to `peer`, for diagnostics.
    pub fn link_state(&self, peer: SessionId) -> Option<crate::peer::PeerLinkState> {
        self.proximity.link_state(peer)
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` for caller misuses (an out-of-bounds local
    /// move); network-originated anomalies are absorbed, not errored.
    pub fn handle(
        &mut self,
        event: ClientEvent,
        media: &mut impl MediaEngine,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Server(message) => Ok(self.handle_server(message, media)),
            ClientEvent::LocalMove { position } => self.handle_local_move(position, media),
            ClientEvent::TransportState { peer, state } => {
                Ok(self.proximity.on_transport_state(peer, state, media))
            },
            ClientEvent::RemoteMediaArrived { peer } => {
                self.proximity.on_remote_media(peer, media);
                Ok(vec![])
            },
            ClientEvent::SetMuted { muted } => {
                media.set_muted(muted);
                Ok(vec![])
            },
        }
    }

    /// Dispatch one inbound server message.
    fn handle_server(
        &mut self,
        message: ServerMessage,
        media: &mut impl MediaEngine,
    ) -> Vec<ClientAction> {
        match message {
            ServerMessage::Welcome { self_id, participants } => {
                self.self_id = Some(self_id);
                for info in participants {
                    self.names.insert(info.id, info.name);
                    if let Some(position) = info.position {
                        self.tracker.set_remote(info.id, position);
                    }
                }
                vec![]
            },

            ServerMessage::ParticipantJoined { participant } => {
                self.names.insert(participant.id, participant.name.clone());
                let mut actions = vec![ClientAction::ParticipantJoined {
                    id: participant.id,
                    name: participant.name,
                }];
                if let Some(position) = participant.position {
                    self.tracker.set_remote(participant.id, position);
                    actions.extend(self.proximity.evaluate(self.tracker.snapshot(), media));
                }
                actions
            },

            ServerMessage::ParticipantLeft { id } => {
                self.names.remove(&id);
                self.tracker.remove_remote(id);
                let mut actions = self.proximity.on_peer_left(id, media);
                actions.push(ClientAction::ParticipantLeft { id });
                actions
            },

            ServerMessage::Moved { id, position } => {
                self.tracker.set_remote(id, position);
                self.proximity.evaluate(self.tracker.snapshot(), media)
            },

            ServerMessage::RoomJoined { room_id } => {
                vec![ClientAction::RoomChanged { room_id }]
            },

            ServerMessage::JoinedRoomNotice { id, name } => {
                vec![ClientAction::RoomPeerJoined { id, name }]
            },

            ServerMessage::LeftRoomNotice { id, name } => {
                vec![ClientAction::RoomPeerLeft { id, name }]
            },

            ServerMessage::Chat { id, name, message, timestamp } => {
                vec![ClientAction::ChatReceived { id, name, message, timestamp }]
            },

            ServerMessage::SignalOffer { from_id, description } => {
                let Some(self_id) = self.self_id else {
                    tracing::warn!(from_id, "dropping offer received before welcome");
                    return vec![];
                };
                let audio = self.audio_params_toward(from_id);
                self.proximity.on_offer(self_id, from_id, &description, audio, media)
            },

            ServerMessage::SignalAnswer { from_id, description } => {
                self.proximity.on_answer(from_id, &description, media)
            },

            ServerMessage::SignalCandidate { from_id, candidate } => {
                self.proximity.on_candidate(from_id, candidate, media)
            },
        }
    }

    /// A confirmed local move: track it, report it, re-evaluate the mesh.
    fn handle_local_move(
        &mut self,
        position: Position,
        media: &mut impl MediaEngine,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if !position.in_world_bounds() {
            return Err(ClientError::PositionOutOfBounds { x: position.x, y: position.y });
        }
        self.tracker.set_local(position);
        let mut actions = vec![ClientAction::Send(ClientMessage::Move { position })];
        actions.extend(self.proximity.evaluate(self.tracker.snapshot(), media));
        Ok(actions)
    }

    /// Spatial parameters for a peer based on tracked positions; silent when
    /// either position is unknown.
    fn audio_params_toward(&self, peer: SessionId) -> AudioParams {
        let snapshot = self.tracker.snapshot();
        match (snapshot.local, snapshot.remotes.get(&peer)) {
            (Some(local), Some(&position)) => self.proximity.audio_params_for(local, position),
            _ => AudioParams { gain: 0.0, pan: 0.0 },
        }
    }
}
