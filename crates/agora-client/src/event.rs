//! Client events and actions.
//!
//! The client core is a pure state machine: the transport driver and media
//! backend feed [`ClientEvent`]s in, and the resulting [`ClientAction`]s tell
//! the driver what to send and the display layer what to show.

use agora_proto::{ClientMessage, Position, ServerMessage, SessionId};

/// Connectivity reports from the underlying media transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerTransportState {
    /// The peer-to-peer transport reached a connected state.
    Connected,
    /// The transport failed; the link cannot recover.
    Failed,
    /// The transport closed.
    Closed,
}

/// Inputs to the client state machine.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A message arrived from the server.
    Server(ServerMessage),

    /// The local participant moved (confirmed by the input/scene layer).
    LocalMove {
        /// New local position.
        position: Position,
    },

    /// The media backend reported a transport state change for one peer.
    TransportState {
        /// The peer whose transport changed.
        peer: SessionId,
        /// New transport state.
        state: PeerTransportState,
    },

    /// First remote media arrived for a peer; audio can be attached.
    RemoteMediaArrived {
        /// The peer whose media arrived.
        peer: SessionId,
    },

    /// Toggle the shared local capture.
    SetMuted {
        /// Whether capture should be muted.
        muted: bool,
    },
}

/// Outputs of the client state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Send this message to the server.
    Send(ClientMessage),

    /// A chat message for the display layer.
    ChatReceived {
        /// Sender session id.
        id: SessionId,
        /// Sender display name.
        name: String,
        /// Message text.
        message: String,
        /// Server wall-clock time, unix milliseconds.
        timestamp: u64,
    },

    /// The local participant's room changed (join acknowledged).
    RoomChanged {
        /// The room now joined.
        room_id: String,
    },

    /// Someone entered the local participant's room.
    RoomPeerJoined {
        /// Their session id.
        id: SessionId,
        /// Their display name.
        name: String,
    },

    /// Someone left the local participant's room.
    RoomPeerLeft {
        /// Their session id.
        id: SessionId,
        /// Their display name.
        name: String,
    },

    /// A participant connected to the space.
    ParticipantJoined {
        /// Their session id.
        id: SessionId,
        /// Their display name.
        name: String,
    },

    /// A participant disconnected from the space.
    ParticipantLeft {
        /// Their session id.
        id: SessionId,
    },

    /// A voice link reached connected state.
    PeerConnected {
        /// The connected peer.
        peer: SessionId,
    },

    /// A voice link was torn down; its resources are released.
    PeerDisconnected {
        /// The disconnected peer.
        peer: SessionId,
    },

    /// The local capture could not be acquired; presence continues without
    /// voice for the affected peer.
    MediaUnavailable {
        /// Backend-specific description.
        reason: String,
    },
}
