use confide_core::{IceCandidate, PeerId, RoomToken, SessionDescription, SignalMessage};

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_relay_reaches_only_the_other_member() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("abc").unwrap();
    let (a, b) = (PeerId::new(), PeerId::new());

    registry.join(&room, a.clone()).await;
    registry.join(&room, b.clone()).await;

    let offer = SignalMessage::Offer(SessionDescription::offer("v=0 a"));
    let candidate = SignalMessage::Candidate(IceCandidate::new("candidate:a"));
    registry.relay(&room, a.clone(), offer.clone()).await;
    registry.relay(&room, a.clone(), candidate.clone()).await;
    registry.members(&room).await;

    assert_eq!(signaling.signals_for(&b).await, vec![offer, candidate]);
    // `a` only ever saw the membership event, never its own messages.
    assert_eq!(signaling.signals_for(&a).await, vec![SignalMessage::PeerJoined]);
}

#[tokio::test]
async fn test_refused_peer_cannot_relay() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("abc").unwrap();
    let (a, b, intruder) = (PeerId::new(), PeerId::new(), PeerId::new());

    registry.join(&room, a.clone()).await;
    registry.join(&room, b.clone()).await;
    registry.join(&room, intruder.clone()).await;

    registry
        .relay(
            &room,
            intruder,
            SignalMessage::Offer(SessionDescription::offer("v=0 intruder")),
        )
        .await;
    registry.members(&room).await;

    assert_eq!(signaling.signals_for(&a).await, vec![SignalMessage::PeerJoined]);
    assert!(signaling.signals_for(&b).await.is_empty());
}

#[tokio::test]
async fn test_membership_messages_are_not_relayed() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("abc").unwrap();
    let (a, b) = (PeerId::new(), PeerId::new());

    registry.join(&room, a.clone()).await;
    registry.join(&room, b.clone()).await;
    registry.relay(&room, b.clone(), SignalMessage::PeerLeft).await;
    registry.relay(&room, b.clone(), SignalMessage::Full).await;
    registry.members(&room).await;

    assert_eq!(signaling.signals_for(&a).await, vec![SignalMessage::PeerJoined]);
}

#[tokio::test]
async fn test_relay_preserves_send_order() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("ordered").unwrap();
    let (a, b) = (PeerId::new(), PeerId::new());

    registry.join(&room, a.clone()).await;
    registry.join(&room, b.clone()).await;

    let sent: Vec<SignalMessage> = (0..20)
        .map(|i| SignalMessage::Candidate(IceCandidate::new(format!("candidate:{i}"))))
        .collect();
    for msg in &sent {
        registry.relay(&room, b.clone(), msg.clone()).await;
    }
    registry.members(&room).await;

    let received: Vec<SignalMessage> = signaling
        .signals_for(&a)
        .await
        .into_iter()
        .filter(|m| matches!(m, SignalMessage::Candidate(_)))
        .collect();
    assert_eq!(received, sent);
}
