//! Signaling Relay
//!
//! Server-side pass-through for the offer/answer/candidate handshake. The
//! relay never interprets payloads: it swaps the `target_id` for the sender's
//! id and forwards the description or candidate verbatim to the target's
//! connection. Unknown targets (disconnected mid-handshake) are a logged
//! no-op; the initiating client's next proximity evaluation re-attempts if
//! the peer is still around.

use std::collections::HashMap;

use agora_proto::{ClientMessage, ServerMessage, SessionId};

use crate::registry::{Participant, RegistryAction};

/// Forward one signaling message from `from` to its target.
///
/// Returns `None` for unknown targets and for non-signaling messages.
pub fn relay_signal(
    participants: &HashMap<SessionId, Participant>,
    from: SessionId,
    message: ClientMessage,
) -> Option<RegistryAction> {
    let (target_id, relayed) = match message {
        ClientMessage::SignalOffer { target_id, description } => {
            (target_id, ServerMessage::SignalOffer { from_id: from, description })
        },
        ClientMessage::SignalAnswer { target_id, description } => {
            (target_id, ServerMessage::SignalAnswer { from_id: from, description })
        },
        ClientMessage::SignalCandidate { target_id, candidate } => {
            (target_id, ServerMessage::SignalCandidate { from_id: from, candidate })
        },
        _ => return None,
    };

    if !participants.contains_key(&target_id) {
        tracing::debug!(from, target_id, "dropping signal for unknown target");
        return None;
    }

    Some(RegistryAction::Unicast { session_id: target_id, message: relayed })
}
