//! Full client lifecycle: join, approach, hear, pan, walk away.

#![allow(clippy::unwrap_used)]

mod common;

use agora_core::spatial::SpatialConfig;
use agora_client::{
    Client, ClientAction, ClientEvent, PeerLinkState, PeerTransportState, ProximityConfig,
};
use agora_proto::{ClientMessage, ParticipantInfo, Position, ServerMessage, SessionId};
use common::MockMedia;
use serde_json::json;

fn server(message: ServerMessage) -> ClientEvent {
    ClientEvent::Server(message)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Two participants drift together, connect, pan around each other, and
/// drift apart again. Checks the audio parameters at each step.
#[test]
fn approach_connect_pan_and_depart() {
    let mut media = MockMedia::new();
    let mut client = Client::new(ProximityConfig::default(), SpatialConfig::default());
    let peer: SessionId = 2;

    client
        .handle(
            server(ServerMessage::Welcome {
                self_id: 1,
                participants: vec![ParticipantInfo { id: peer, name: "b".into(), position: None }],
            }),
            &mut media,
        )
        .unwrap();

    let actions = client
        .handle(ClientEvent::LocalMove { position: Position::new(0.0, 0.0) }, &mut media)
        .unwrap();
    assert!(actions.contains(&ClientAction::Send(ClientMessage::Move {
        position: Position::new(0.0, 0.0)
    })));

    // The peer steps into range directly east of us.
    let actions = client
        .handle(server(ServerMessage::Moved { id: peer, position: Position::new(100.0, 0.0) }), &mut media)
        .unwrap();
    assert!(actions.iter().any(|a| matches!(
        a,
        ClientAction::Send(ClientMessage::SignalOffer { target_id: 2, .. })
    )));
    assert_eq!(client.link_state(peer), Some(PeerLinkState::Offering));

    // Negotiation completes.
    client
        .handle(server(ServerMessage::SignalAnswer { from_id: peer, description: json!({}) }), &mut media)
        .unwrap();
    let actions = client
        .handle(
            ClientEvent::TransportState { peer, state: PeerTransportState::Connected },
            &mut media,
        )
        .unwrap();
    assert!(actions.contains(&ClientAction::PeerConnected { peer }));

    // Remote audio arrives: attached at half falloff, dead ahead.
    client.handle(ClientEvent::RemoteMediaArrived { peer }, &mut media).unwrap();
    let attached = media.attached.get(&peer).copied().unwrap();
    assert!(approx(attached.gain, 0.4), "gain at 100 of 200 should be 0.4, got {}", attached.gain);
    assert!(approx(attached.pan, 0.0));

    // The peer circles to due north: same distance, full right pan.
    client
        .handle(server(ServerMessage::Moved { id: peer, position: Position::new(0.0, 100.0) }), &mut media)
        .unwrap();
    let audio = media.audio.get(&peer).copied().unwrap();
    assert!(approx(audio.gain, 0.4));
    assert!(approx(audio.pan, 1.0));

    // And walks out of earshot.
    let actions = client
        .handle(server(ServerMessage::Moved { id: peer, position: Position::new(300.0, 0.0) }), &mut media)
        .unwrap();
    assert!(actions.contains(&ClientAction::PeerDisconnected { peer }));
    assert!(media.closed.contains(&peer));
    assert!(media.open.is_empty());
    assert_eq!(client.link_count(), 0);
}

#[test]
fn departed_participant_is_forgotten_entirely() {
    let mut media = MockMedia::new();
    let mut client = Client::new(ProximityConfig::default(), SpatialConfig::default());

    client
        .handle(
            server(ServerMessage::Welcome {
                self_id: 1,
                participants: vec![ParticipantInfo {
                    id: 2,
                    name: "b".into(),
                    position: Some(Position::new(50.0, 0.0)),
                }],
            }),
            &mut media,
        )
        .unwrap();
    client.handle(ClientEvent::LocalMove { position: Position::new(0.0, 0.0) }, &mut media).unwrap();
    assert_eq!(client.link_count(), 1);

    let actions = client
        .handle(server(ServerMessage::ParticipantLeft { id: 2 }), &mut media)
        .unwrap();
    assert!(actions.contains(&ClientAction::PeerDisconnected { peer: 2 }));
    assert!(actions.contains(&ClientAction::ParticipantLeft { id: 2 }));

    // A later local move must not resurrect the link from a stale position.
    let actions = client
        .handle(ClientEvent::LocalMove { position: Position::new(1.0, 0.0) }, &mut media)
        .unwrap();
    assert!(!actions.iter().any(|a| matches!(a, ClientAction::Send(ClientMessage::SignalOffer { .. }))));
    assert_eq!(client.link_count(), 0);
}

#[test]
fn joiner_with_position_in_range_connects_immediately() {
    let mut media = MockMedia::new();
    let mut client = Client::new(ProximityConfig::default(), SpatialConfig::default());

    client
        .handle(server(ServerMessage::Welcome { self_id: 1, participants: vec![] }), &mut media)
        .unwrap();
    client.handle(ClientEvent::LocalMove { position: Position::new(0.0, 0.0) }, &mut media).unwrap();

    let actions = client
        .handle(
            server(ServerMessage::ParticipantJoined {
                participant: ParticipantInfo {
                    id: 3,
                    name: "c".into(),
                    position: Some(Position::new(10.0, 10.0)),
                },
            }),
            &mut media,
        )
        .unwrap();
    assert!(actions.contains(&ClientAction::ParticipantJoined { id: 3, name: "c".into() }));
    assert!(actions.iter().any(|a| matches!(
        a,
        ClientAction::Send(ClientMessage::SignalOffer { target_id: 3, .. })
    )));
}

#[test]
fn room_membership_events_reach_the_display_layer() {
    let mut media = MockMedia::new();
    let mut client = Client::new(ProximityConfig::default(), SpatialConfig::default());

    let actions = client
        .handle(server(ServerMessage::RoomJoined { room_id: "lounge".into() }), &mut media)
        .unwrap();
    assert_eq!(actions, vec![ClientAction::RoomChanged { room_id: "lounge".into() }]);

    let actions = client
        .handle(server(ServerMessage::JoinedRoomNotice { id: 4, name: "d".into() }), &mut media)
        .unwrap();
    assert_eq!(actions, vec![ClientAction::RoomPeerJoined { id: 4, name: "d".into() }]);

    let actions = client
        .handle(server(ServerMessage::LeftRoomNotice { id: 4, name: "d".into() }), &mut media)
        .unwrap();
    assert_eq!(actions, vec![ClientAction::RoomPeerLeft { id: 4, name: "d".into() }]);
}

#[test]
fn mute_toggle_reaches_the_media_backend() {
    let mut media = MockMedia::new();
    let mut client = Client::new(ProximityConfig::default(), SpatialConfig::default());

    client.handle(ClientEvent::SetMuted { muted: true }, &mut media).unwrap();
    assert!(media.muted);
    client.handle(ClientEvent::SetMuted { muted: false }, &mut media).unwrap();
    assert!(!media.muted);
}
