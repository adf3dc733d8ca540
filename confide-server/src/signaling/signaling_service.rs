use crate::signaling::SignalingOutput;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use axum::extract::ws::Message;
use confide_core::{PeerId, SignalMessage};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
}

/// Outbound WebSocket queues of every open signaling connection.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
    }

    pub fn connected_peers(&self) -> usize {
        self.inner.peers.len()
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_signal(&self, peer_id: &PeerId, msg: SignalMessage) -> anyhow::Result<()> {
        let json = msg
            .encode()
            .context("Failed to serialize signal message")?;

        let peer = self
            .inner
            .peers
            .get(peer_id)
            .ok_or_else(|| anyhow!("peer {} is not connected", peer_id))?;

        debug!("Sending {} to {}", msg.kind(), peer_id);
        peer.send(Message::Text(json.into()))
            .map_err(|_| anyhow!("outbound queue of {} is closed", peer_id))
    }
}
