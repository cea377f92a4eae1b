//! Client→server and server→client message shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ProtoError, SessionId, position::Position};

/// Summary of one participant, sent in the welcome snapshot and join events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    /// Session id of the participant.
    pub id: SessionId,
    /// Display name.
    pub name: String,
    /// Last-known position, absent until the first accepted move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Messages sent by a client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message on every connection; identifies the participant.
    ///
    /// Identity is assumed pre-validated (authentication is out of scope).
    Hello {
        /// Display name.
        name: String,
        /// Optional authenticated user id.
        #[serde(skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    /// Join a named room, leaving the previous one if any.
    JoinRoom {
        /// Room to join.
        room_id: String,
    },
    /// Report a new position.
    Move {
        /// The new position.
        position: Position,
    },
    /// Send a chat message, optionally to an explicit room.
    Chat {
        /// Message text.
        message: String,
        /// Explicit destination room; defaults to the sender's room.
        #[serde(skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
    },
    /// Relay a session offer to another participant.
    SignalOffer {
        /// Recipient session id.
        target_id: SessionId,
        /// Opaque media description, forwarded verbatim.
        description: Value,
    },
    /// Relay a session answer to another participant.
    SignalAnswer {
        /// Recipient session id.
        target_id: SessionId,
        /// Opaque media description, forwarded verbatim.
        description: Value,
    },
    /// Relay a network-path candidate to another participant.
    SignalCandidate {
        /// Recipient session id.
        target_id: SessionId,
        /// Opaque candidate, forwarded verbatim.
        candidate: Value,
    },
}

/// Messages sent by the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Initial snapshot, unicast to a new arrival.
    Welcome {
        /// Session id assigned to the recipient.
        self_id: SessionId,
        /// Everyone already connected.
        participants: Vec<ParticipantInfo>,
    },
    /// A new participant connected.
    ParticipantJoined {
        /// The new participant.
        #[serde(flatten)]
        participant: ParticipantInfo,
    },
    /// A participant disconnected.
    ParticipantLeft {
        /// Session id of the departed participant.
        id: SessionId,
    },
    /// Unicast acknowledgement of a room join.
    RoomJoined {
        /// Room that was joined.
        room_id: String,
    },
    /// A participant entered the recipient's room.
    JoinedRoomNotice {
        /// Session id of the joiner.
        id: SessionId,
        /// Display name of the joiner.
        name: String,
    },
    /// A participant left the recipient's room.
    LeftRoomNotice {
        /// Session id of the leaver.
        id: SessionId,
        /// Display name of the leaver.
        name: String,
    },
    /// A participant moved.
    Moved {
        /// Session id of the mover.
        id: SessionId,
        /// New position.
        position: Position,
    },
    /// A chat message.
    Chat {
        /// Session id of the sender.
        id: SessionId,
        /// Display name of the sender.
        name: String,
        /// Message text.
        message: String,
        /// Server wall-clock time, unix milliseconds.
        timestamp: u64,
    },
    /// Relayed session offer.
    SignalOffer {
        /// Session id of the offerer.
        from_id: SessionId,
        /// Opaque media description.
        description: Value,
    },
    /// Relayed session answer.
    SignalAnswer {
        /// Session id of the answerer.
        from_id: SessionId,
        /// Opaque media description.
        description: Value,
    },
    /// Relayed network-path candidate.
    SignalCandidate {
        /// Session id of the sender.
        from_id: SessionId,
        /// Opaque candidate.
        candidate: Value,
    },
}

impl ClientMessage {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from a JSON text frame.
    pub fn from_json(text: &str) -> Result<Self, ProtoError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ServerMessage {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from a JSON text frame.
    pub fn from_json(text: &str) -> Result<Self, ProtoError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn move_message_wire_shape() {
        let msg = ClientMessage::Move { position: Position::new(100.0, -50.0) };
        let text = msg.to_json().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "move");
        assert_eq!(value["position"]["x"], 100.0);
        assert_eq!(ClientMessage::from_json(&text).unwrap(), msg);
    }

    #[test]
    fn signal_payload_survives_relay_untouched() {
        let description = json!({"sdp": "v=0...", "kind": "offer", "extra": [1, 2, 3]});
        let msg = ClientMessage::SignalOffer { target_id: 7, description: description.clone() };
        let decoded = ClientMessage::from_json(&msg.to_json().unwrap()).unwrap();
        match decoded {
            ClientMessage::SignalOffer { target_id, description: d } => {
                assert_eq!(target_id, 7);
                assert_eq!(d, description);
            },
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn welcome_omits_absent_positions() {
        let msg = ServerMessage::Welcome {
            self_id: 1,
            participants: vec![ParticipantInfo { id: 2, name: "ada".into(), position: None }],
        };
        let text = msg.to_json().unwrap();
        assert!(!text.contains("position"));
    }

    #[test]
    fn unknown_type_fails_to_decode() {
        assert!(ClientMessage::from_json(r#"{"type":"teleport","x":1}"#).is_err());
    }
}
