use confide_core::{PeerId, RoomToken, SignalMessage};
use confide_server::Admission;

use crate::integration::{create_test_registry, init_tracing, wait_until};

#[tokio::test]
async fn test_first_joiner_receives_nothing() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("abc").unwrap();
    let a = PeerId::new();

    registry.join(&room, a.clone()).await;
    registry.members(&room).await;

    assert!(signaling.signals_for(&a).await.is_empty());
    assert!(registry.contains(&room));
}

#[tokio::test]
async fn test_leave_notifies_remaining_member() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("abc").unwrap();
    let (a, b) = (PeerId::new(), PeerId::new());

    registry.join(&room, a.clone()).await;
    registry.join(&room, b.clone()).await;
    registry.leave(&room, b.clone()).await;

    assert_eq!(registry.members(&room).await, vec![a.clone()]);
    assert_eq!(
        signaling.signals_for(&a).await,
        vec![SignalMessage::PeerJoined, SignalMessage::PeerLeft]
    );
    assert!(signaling.signals_for(&b).await.is_empty());
}

#[tokio::test]
async fn test_empty_room_is_dropped() {
    init_tracing();

    let (registry, _signaling, _rx) = create_test_registry();
    let room = RoomToken::new("short-lived").unwrap();
    let (a, b) = (PeerId::new(), PeerId::new());

    registry.join(&room, a.clone()).await;
    registry.join(&room, b.clone()).await;
    registry.leave(&room, a).await;
    registry.leave(&room, b).await;

    assert!(wait_until(1000, || !registry.contains(&room)).await);
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_rejoin_repeats_peer_joined_cycle() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("abc").unwrap();
    let a = PeerId::new();
    let b = PeerId::new();
    let b_again = PeerId::new();

    registry.join(&room, a.clone()).await;
    registry.join(&room, b.clone()).await;
    registry.leave(&room, b).await;
    assert_eq!(registry.join(&room, b_again.clone()).await, Admission::Admitted);
    registry.members(&room).await;

    assert_eq!(
        signaling.signals_for(&a).await,
        vec![
            SignalMessage::PeerJoined,
            SignalMessage::PeerLeft,
            SignalMessage::PeerJoined,
        ]
    );
    assert!(signaling.signals_for(&b_again).await.is_empty());
}

#[tokio::test]
async fn test_join_after_room_drop_gets_fresh_room() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("recycled").unwrap();
    let a = PeerId::new();

    registry.join(&room, a.clone()).await;
    registry.leave(&room, a).await;

    // Whether or not the old actor has finished retiring, the join lands in a live room.
    let c = PeerId::new();
    assert_eq!(registry.join(&room, c.clone()).await, Admission::Admitted);
    assert_eq!(registry.members(&room).await, vec![c.clone()]);
    assert!(signaling.signals_for(&c).await.is_empty());
}

#[tokio::test]
async fn test_unreachable_member_is_evicted() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("flaky").unwrap();
    let (a, b) = (PeerId::new(), PeerId::new());

    registry.join(&room, a.clone()).await;
    signaling.mark_unreachable(&a).await;

    // Notifying `a` about `b` fails, so `a` is dropped and `b` hears that it left.
    registry.join(&room, b.clone()).await;

    assert_eq!(registry.members(&room).await, vec![b.clone()]);
    assert_eq!(signaling.signals_for(&b).await, vec![SignalMessage::PeerLeft]);
}
