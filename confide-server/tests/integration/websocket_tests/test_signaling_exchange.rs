use confide_core::{IceCandidate, RoomToken, SessionDescription, SignalMessage};

use crate::integration::{init_tracing, spawn_server, wait_until};
use crate::utils::TestClient;

#[tokio::test]
async fn test_offer_answer_candidate_relay() {
    init_tracing();

    let (addr, _state) = spawn_server().await;

    let mut a = TestClient::connect(addr, "abc").await.unwrap();
    assert!(a.is_silent().await);

    let mut b = TestClient::connect(addr, "abc").await.unwrap();
    a.expect(SignalMessage::PeerJoined).await.unwrap();

    let offer = SignalMessage::Offer(SessionDescription::offer("v=0 from-a"));
    a.send(&offer).await.unwrap();
    b.expect(offer).await.unwrap();

    let answer = SignalMessage::Answer(SessionDescription::answer("v=0 from-b"));
    b.send(&answer).await.unwrap();
    a.expect(answer).await.unwrap();

    let candidate = SignalMessage::Candidate(IceCandidate::new("candidate:b"));
    b.send(&candidate).await.unwrap();
    a.expect(candidate).await.unwrap();

    // Nobody gets their own messages back.
    assert!(a.is_silent().await);
    assert!(b.is_silent().await);
}

#[tokio::test]
async fn test_disconnect_and_rejoin() {
    init_tracing();

    let (addr, state) = spawn_server().await;

    let mut a = TestClient::connect(addr, "abc").await.unwrap();
    let b = TestClient::connect(addr, "abc").await.unwrap();
    a.expect(SignalMessage::PeerJoined).await.unwrap();

    b.close().await;
    a.expect(SignalMessage::PeerLeft).await.unwrap();

    let mut b = TestClient::connect(addr, "abc").await.unwrap();
    a.expect(SignalMessage::PeerJoined).await.unwrap();
    assert!(b.is_silent().await);

    a.close().await;
    b.expect(SignalMessage::PeerLeft).await.unwrap();
    b.close().await;

    let room = RoomToken::new("abc").unwrap();
    assert!(wait_until(2000, || !state.registry.contains(&room)).await);
}

#[tokio::test]
async fn test_client_cannot_forge_membership_events() {
    init_tracing();

    let (addr, _state) = spawn_server().await;

    let mut a = TestClient::connect(addr, "abc").await.unwrap();
    let mut b = TestClient::connect(addr, "abc").await.unwrap();
    a.expect(SignalMessage::PeerJoined).await.unwrap();

    b.send(&SignalMessage::PeerLeft).await.unwrap();
    b.send(&SignalMessage::Full).await.unwrap();
    b.send_raw("{\"type\":\"bogus\"}").await.unwrap();
    b.send_raw("not json at all").await.unwrap();

    assert!(a.is_silent().await);

    // The connection survives garbage and still relays.
    let offer = SignalMessage::Offer(SessionDescription::offer("v=0 late"));
    b.send(&offer).await.unwrap();
    a.expect(offer).await.unwrap();
}
