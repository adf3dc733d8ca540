use anyhow::bail;
use async_trait::async_trait;
use confide_core::{PeerId, SignalMessage};
use confide_server::SignalingOutput;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingOutput that captures every outgoing signal.
#[derive(Clone)]
pub struct MockSignalingOutput {
    /// Channel to forward captured signals.
    tx: mpsc::UnboundedSender<(PeerId, SignalMessage)>,
    /// All captured signals (for verification).
    signals: Arc<Mutex<Vec<(PeerId, SignalMessage)>>>,
    /// Peers whose delivery should fail, as if their socket had gone away.
    unreachable: Arc<Mutex<HashSet<PeerId>>>,
}

impl MockSignalingOutput {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(PeerId, SignalMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            signals: Arc::new(Mutex::new(Vec::new())),
            unreachable: Arc::new(Mutex::new(HashSet::new())),
        };
        (signaling, rx)
    }

    pub async fn mark_unreachable(&self, peer_id: &PeerId) {
        self.unreachable.lock().await.insert(peer_id.clone());
    }

    /// Everything delivered to `peer_id`, in delivery order.
    pub async fn signals_for(&self, peer_id: &PeerId) -> Vec<SignalMessage> {
        self.signals
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == peer_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub async fn total(&self) -> usize {
        self.signals.lock().await.len()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send_signal(&self, peer_id: &PeerId, msg: SignalMessage) -> anyhow::Result<()> {
        if self.unreachable.lock().await.contains(peer_id) {
            bail!("peer {} is unreachable", peer_id);
        }

        tracing::debug!("[MockSignaling] {} to {}", msg.kind(), peer_id);
        self.signals.lock().await.push((peer_id.clone(), msg.clone()));
        let _ = self.tx.send((peer_id.clone(), msg));
        Ok(())
    }
}
