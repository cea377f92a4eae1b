//! Presence Registry
//!
//! Single source of truth for "who is here, where, and in which room", and
//! the fan-out point for movement and chat.
//!
//! ## Responsibilities
//!
//! - Session lifecycle: allocate session ids, track participants, clean up on
//!   disconnect
//! - Room membership: at most one room per participant, implicit creation on
//!   first join
//! - Fan-out: resolve the audience for every movement/chat/presence event
//! - Action-based: all methods return actions, no direct I/O
//!
//! ## Audience rule
//!
//! If the sender is in a room, movement and unscoped chat go to that room's
//! other members only; if the sender is in no room, they go to every other
//! connected participant. The no-room fallback is deliberate ("open world"
//! vs "private room" semantics) and preserved exactly.

use std::collections::{HashMap, HashSet};

use agora_core::env::Environment;
use agora_proto::{ClientMessage, ParticipantInfo, Position, ServerMessage, SessionId};

use crate::relay;

/// One connected participant.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Session id, unique per connection.
    pub id: SessionId,
    /// Display name.
    pub name: String,
    /// Optional authenticated user id (identity validation is upstream).
    pub user_id: Option<String>,
    /// Current room, if any.
    pub room: Option<String>,
    /// Last accepted position, absent until the first valid move.
    pub position: Option<Position>,
}

/// Delivery actions returned by the registry for the driver to execute.
///
/// The registry resolves audiences itself so the fan-out rules are fully
/// unit-testable; the driver only writes frames to connections.
#[derive(Debug, Clone)]
pub enum RegistryAction {
    /// Send one message to one participant.
    Unicast {
        /// Recipient session id.
        session_id: SessionId,
        /// Message to deliver.
        message: ServerMessage,
    },

    /// Send one message to a resolved set of participants.
    Broadcast {
        /// Recipient session ids.
        recipients: Vec<SessionId>,
        /// Message to deliver.
        message: ServerMessage,
    },
}

/// Authoritative map of connected participants and room membership.
///
/// Pure state machine: every operation returns delivery actions and performs
/// no I/O. The driver serializes operations behind one lock, which gives the
/// single-threaded-equivalent atomicity the fan-out rules rely on.
pub struct PresenceRegistry {
    /// All connected participants by session id.
    participants: HashMap<SessionId, Participant>,
    /// Room membership sets. Rooms are created implicitly by first join and
    /// persist as empty sets once everyone leaves.
    rooms: HashMap<String, HashSet<SessionId>>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { participants: HashMap::new(), rooms: HashMap::new() }
    }

    /// Number of connected participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether no participants are connected.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Look up a participant by session id.
    pub fn participant(&self, session_id: SessionId) -> Option<&Participant> {
        self.participants.get(&session_id)
    }

    /// Members of a room. Empty for unknown rooms.
    pub fn room_members(&self, room_id: &str) -> impl Iterator<Item = SessionId> + '_ {
        self.rooms.get(room_id).into_iter().flatten().copied()
    }

    /// Register a new participant and return their session id plus actions.
    ///
    /// Produces a single welcome unicast to the new arrival (carrying the
    /// existing-participant snapshot) and one joined broadcast to everyone
    /// else.
    pub fn connect(
        &mut self,
        env: &impl Environment,
        name: String,
        user_id: Option<String>,
    ) -> (SessionId, Vec<RegistryAction>) {
        let session_id = self.allocate_session_id(env);

        let snapshot: Vec<ParticipantInfo> = self
            .participants
            .values()
            .map(|p| ParticipantInfo { id: p.id, name: p.name.clone(), position: p.position })
            .collect();
        let others: Vec<SessionId> = self.participants.keys().copied().collect();

        let participant =
            Participant { id: session_id, name: name.clone(), user_id, room: None, position: None };
        self.participants.insert(session_id, participant);

        tracing::info!(session_id, name = %name, "participant connected");

        let mut actions = vec![RegistryAction::Unicast {
            session_id,
            message: ServerMessage::Welcome { self_id: session_id, participants: snapshot },
        }];
        if !others.is_empty() {
            actions.push(RegistryAction::Broadcast {
                recipients: others,
                message: ServerMessage::ParticipantJoined {
                    participant: ParticipantInfo { id: session_id, name, position: None },
                },
            });
        }
        (session_id, actions)
    }

    /// Process one inbound message from a connected participant.
    pub fn handle_message(
        &mut self,
        env: &impl Environment,
        session_id: SessionId,
        message: ClientMessage,
    ) -> Vec<RegistryAction> {
        match message {
            ClientMessage::Hello { .. } => {
                // The driver consumes the hello during connection setup; a
                // repeat is a protocol misuse, dropped without side effects.
                tracing::warn!(session_id, "duplicate hello ignored");
                vec![]
            },
            ClientMessage::JoinRoom { room_id } => self.join_room(session_id, room_id),
            ClientMessage::Move { position } => self.move_to(session_id, position),
            ClientMessage::Chat { message, room_id } => {
                self.chat(env, session_id, &message, room_id)
            },
            signal @ (ClientMessage::SignalOffer { .. }
            | ClientMessage::SignalAnswer { .. }
            | ClientMessage::SignalCandidate { .. }) => {
                relay::relay_signal(&self.participants, session_id, signal)
                    .into_iter()
                    .collect()
            },
        }
    }

    /// Move a participant into a room, leaving their previous room if any.
    ///
    /// Unknown sessions are a silent no-op. Re-joining the current room only
    /// re-sends the acknowledgement.
    pub fn join_room(&mut self, session_id: SessionId, room_id: String) -> Vec<RegistryAction> {
        let Some(participant) = self.participants.get(&session_id) else {
            tracing::debug!(session_id, "join_room for unknown session");
            return vec![];
        };
        let name = participant.name.clone();

        if participant.room.as_deref() == Some(room_id.as_str()) {
            return vec![RegistryAction::Unicast {
                session_id,
                message: ServerMessage::RoomJoined { room_id },
            }];
        }

        let mut actions = Vec::new();

        if let Some(previous) = self.remove_from_room(session_id) {
            let remaining: Vec<SessionId> = self.room_members(&previous).collect();
            if !remaining.is_empty() {
                actions.push(RegistryAction::Broadcast {
                    recipients: remaining,
                    message: ServerMessage::LeftRoomNotice { id: session_id, name: name.clone() },
                });
            }
        }

        self.rooms.entry(room_id.clone()).or_default().insert(session_id);
        if let Some(p) = self.participants.get_mut(&session_id) {
            p.room = Some(room_id.clone());
        }

        tracing::debug!(session_id, room = %room_id, "joined room");

        actions.push(RegistryAction::Unicast {
            session_id,
            message: ServerMessage::RoomJoined { room_id: room_id.clone() },
        });

        let peers: Vec<SessionId> =
            self.room_members(&room_id).filter(|&id| id != session_id).collect();
        if !peers.is_empty() {
            actions.push(RegistryAction::Broadcast {
                recipients: peers,
                message: ServerMessage::JoinedRoomNotice { id: session_id, name },
            });
        }

        actions
    }

    /// Update a participant's position and broadcast the move.
    ///
    /// Movement is a best-effort stream: non-finite or out-of-bounds input is
    /// dropped with a warning, never surfaced to the sender, and unknown
    /// sessions (a disconnect racing a queued move) are a silent no-op.
    pub fn move_to(&mut self, session_id: SessionId, position: Position) -> Vec<RegistryAction> {
        if !position.in_world_bounds() {
            tracing::warn!(session_id, ?position, "rejected out-of-bounds move");
            return vec![];
        }
        let Some(participant) = self.participants.get_mut(&session_id) else {
            tracing::debug!(session_id, "move for unknown session");
            return vec![];
        };
        participant.position = Some(position);

        let recipients = self.audience_of(session_id);
        if recipients.is_empty() {
            return vec![];
        }
        vec![RegistryAction::Broadcast {
            recipients,
            message: ServerMessage::Moved { id: session_id, position },
        }]
    }

    /// Forward a chat message to its audience.
    ///
    /// An explicit `room_id` overrides the sender's room; otherwise the
    /// standard audience rule applies. Whitespace-only text is dropped.
    pub fn chat(
        &mut self,
        env: &impl Environment,
        session_id: SessionId,
        message: &str,
        room_id: Option<String>,
    ) -> Vec<RegistryAction> {
        if message.trim().is_empty() {
            tracing::warn!(session_id, "rejected empty chat message");
            return vec![];
        }
        let Some(participant) = self.participants.get(&session_id) else {
            tracing::debug!(session_id, "chat for unknown session");
            return vec![];
        };
        let name = participant.name.clone();

        let recipients = match room_id {
            Some(room) => self.room_members(&room).filter(|&id| id != session_id).collect(),
            None => self.audience_of(session_id),
        };
        if recipients.is_empty() {
            return vec![];
        }
        vec![RegistryAction::Broadcast {
            recipients,
            message: ServerMessage::Chat {
                id: session_id,
                name,
                message: message.to_owned(),
                timestamp: env.unix_millis(),
            },
        }]
    }

    /// Remove a participant, notifying their room and everyone else.
    pub fn disconnect(&mut self, session_id: SessionId) -> Vec<RegistryAction> {
        let Some(participant) = self.participants.get(&session_id) else {
            return vec![];
        };
        let name = participant.name.clone();

        let mut actions = Vec::new();

        if let Some(room) = self.remove_from_room(session_id) {
            let remaining: Vec<SessionId> = self.room_members(&room).collect();
            if !remaining.is_empty() {
                actions.push(RegistryAction::Broadcast {
                    recipients: remaining,
                    message: ServerMessage::LeftRoomNotice { id: session_id, name },
                });
            }
        }

        self.participants.remove(&session_id);
        tracing::info!(session_id, "participant disconnected");

        let everyone: Vec<SessionId> = self.participants.keys().copied().collect();
        if !everyone.is_empty() {
            actions.push(RegistryAction::Broadcast {
                recipients: everyone,
                message: ServerMessage::ParticipantLeft { id: session_id },
            });
        }

        actions
    }

    /// Resolve the standard audience for a sender: their room's other
    /// members, or every other participant when they are in no room.
    fn audience_of(&self, sender: SessionId) -> Vec<SessionId> {
        match self.participants.get(&sender).and_then(|p| p.room.as_deref()) {
            Some(room) => self.room_members(room).filter(|&id| id != sender).collect(),
            None => self.participants.keys().copied().filter(|&id| id != sender).collect(),
        }
    }

    /// Remove the participant from their current room's membership set and
    /// clear their room field. Returns the room they were in.
    ///
    /// Empty rooms persist: membership is a set, not a resource.
    fn remove_from_room(&mut self, session_id: SessionId) -> Option<String> {
        let room = self.participants.get_mut(&session_id).and_then(|p| p.room.take())?;
        if let Some(members) = self.rooms.get_mut(&room) {
            members.remove(&session_id);
        }
        Some(room)
    }

    /// Draw an unused random session id.
    fn allocate_session_id(&self, env: &impl Environment) -> SessionId {
        loop {
            let candidate = env.random_u64();
            if !self.participants.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PresenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceRegistry")
            .field("participants", &self.participants.len())
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
