use confide_core::{PeerId, ROOM_CAPACITY, RoomToken, SignalMessage};
use confide_server::Admission;

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_third_join_is_refused() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("abc").unwrap();
    let (a, b, c) = (PeerId::new(), PeerId::new(), PeerId::new());

    assert_eq!(registry.join(&room, a.clone()).await, Admission::Admitted);
    assert_eq!(registry.join(&room, b.clone()).await, Admission::Admitted);
    assert_eq!(registry.join(&room, c.clone()).await, Admission::Full);

    let members = registry.members(&room).await;
    assert_eq!(members, vec![a.clone(), b.clone()]);

    // Neither member hears about the refused peer, and it hears nothing itself.
    assert_eq!(signaling.signals_for(&a).await, vec![SignalMessage::PeerJoined]);
    assert!(signaling.signals_for(&b).await.is_empty());
    assert!(signaling.signals_for(&c).await.is_empty());
}

#[tokio::test]
async fn test_concurrent_joins_never_exceed_capacity() {
    init_tracing();

    let (registry, _signaling, _rx) = create_test_registry();
    let room = RoomToken::new("crowded").unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        let room = room.clone();
        handles.push(tokio::spawn(async move {
            registry.join(&room, PeerId::new()).await
        }));
    }

    let mut admitted = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Admission::Admitted => admitted += 1,
            Admission::Full => full += 1,
        }
    }

    assert_eq!(admitted, ROOM_CAPACITY);
    assert_eq!(full, 8 - ROOM_CAPACITY);
    assert_eq!(registry.members(&room).await.len(), ROOM_CAPACITY);
}

#[tokio::test]
async fn test_rooms_are_independent() {
    init_tracing();

    let (registry, _signaling, _rx) = create_test_registry();
    let first = RoomToken::new("first").unwrap();
    let second = RoomToken::new("second").unwrap();

    for _ in 0..2 {
        assert_eq!(registry.join(&first, PeerId::new()).await, Admission::Admitted);
        assert_eq!(registry.join(&second, PeerId::new()).await, Admission::Admitted);
    }

    assert_eq!(registry.room_count(), 2);
}

#[tokio::test]
async fn test_repeated_join_is_idempotent() {
    init_tracing();

    let (registry, signaling, _rx) = create_test_registry();
    let room = RoomToken::new("again").unwrap();
    let a = PeerId::new();

    assert_eq!(registry.join(&room, a.clone()).await, Admission::Admitted);
    assert_eq!(registry.join(&room, a.clone()).await, Admission::Admitted);

    assert_eq!(registry.members(&room).await, vec![a]);
    assert_eq!(signaling.total().await, 0);
}
