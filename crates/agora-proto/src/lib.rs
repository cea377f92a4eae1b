//! Wire protocol for the agora presence and signaling layer.
//!
//! Messages travel as tagged JSON text frames over a message-oriented duplex
//! channel (WebSocket in the production server). Signaling payloads
//! (`description`, `candidate`) are opaque [`serde_json::Value`]s: the server
//! relays them verbatim and never interprets their contents.

mod error;
mod message;
mod position;

pub use error::ProtoError;
pub use message::{ClientMessage, ParticipantInfo, ServerMessage};
pub use position::{Position, WORLD_MAX_X, WORLD_MAX_Y, WORLD_MIN_X, WORLD_MIN_Y};

/// Opaque identifier for one active connection.
///
/// Assigned by the server at connect time, unique per connection, and not a
/// durable user identity.
pub type SessionId = u64;
