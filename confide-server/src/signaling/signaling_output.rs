use async_trait::async_trait;
use confide_core::{PeerId, SignalMessage};

/// Outbound side of the signaling channel, as seen by a room.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queue a message for one connected peer. Fails when the peer's
    /// connection is gone.
    async fn send_signal(&self, peer_id: &PeerId, msg: SignalMessage) -> anyhow::Result<()>;
}
