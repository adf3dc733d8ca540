use crate::room::room::{Room, RoomHandle};
use crate::room::room_command::{Admission, JoinReply, RoomCommand};
use crate::signaling::SignalingOutput;
use confide_core::{PeerId, RoomToken, SignalMessage};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Maps room tokens to their room actors.
///
/// Rooms are created on first join and remove themselves once empty.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomToken, RoomHandle>>,
    signaling: Arc<dyn SignalingOutput>,
    next_id: Arc<AtomicU64>,
    buffer: usize,
}

impl RoomRegistry {
    pub fn new(signaling: Arc<dyn SignalingOutput>, buffer: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            signaling,
            next_id: Arc::new(AtomicU64::new(0)),
            buffer: buffer.max(1),
        }
    }

    fn room_sender(&self, token: &RoomToken) -> mpsc::Sender<RoomCommand> {
        if let Some(handle) = self.rooms.get(token) {
            return handle.tx.clone();
        }

        let entry = self.rooms.entry(token.clone()).or_insert_with(|| {
            info!("Creating new room: {}", token);
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let (tx, rx) = mpsc::channel(self.buffer);
            let room = Room::new(
                id,
                token.clone(),
                rx,
                self.signaling.clone(),
                self.rooms.clone(),
            );
            tokio::spawn(room.run());
            RoomHandle { id, tx }
        });
        entry.tx.clone()
    }

    fn existing_sender(&self, token: &RoomToken) -> Option<mpsc::Sender<RoomCommand>> {
        self.rooms.get(token).map(|handle| handle.tx.clone())
    }

    /// Admits `peer_id` into the room or reports it full. A third participant is
    /// refused, never queued.
    pub async fn join(&self, token: &RoomToken, peer_id: PeerId) -> Admission {
        loop {
            let tx = self.room_sender(token);
            let (reply_tx, reply_rx) = oneshot::channel();
            let cmd = RoomCommand::Join {
                peer_id: peer_id.clone(),
                reply: reply_tx,
            };

            if tx.send(cmd).await.is_err() {
                self.forget_closed(token);
                continue;
            }

            match reply_rx.await {
                Ok(JoinReply::Admitted) => return Admission::Admitted,
                Ok(JoinReply::Full) => return Admission::Full,
                Ok(JoinReply::Retired) | Err(_) => {
                    self.forget_closed(token);
                    continue;
                }
            }
        }
    }

    pub async fn relay(&self, token: &RoomToken, peer_id: PeerId, message: SignalMessage) {
        let Some(tx) = self.existing_sender(token) else {
            warn!("Relay for unknown room '{}' from {}", token, peer_id);
            return;
        };
        let _ = tx.send(RoomCommand::Relay { peer_id, message }).await;
    }

    pub async fn leave(&self, token: &RoomToken, peer_id: PeerId) {
        let Some(tx) = self.existing_sender(token) else {
            return;
        };
        let _ = tx.send(RoomCommand::Leave { peer_id }).await;
    }

    /// Current members of a room in join order; empty if the room does not exist.
    pub async fn members(&self, token: &RoomToken) -> Vec<PeerId> {
        let Some(tx) = self.existing_sender(token) else {
            return Vec::new();
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        if tx.send(RoomCommand::Members { reply: reply_tx }).await.is_err() {
            return Vec::new();
        }
        reply_rx.await.unwrap_or_default()
    }

    pub fn contains(&self, token: &RoomToken) -> bool {
        self.rooms.contains_key(token)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Drops an entry whose actor has stopped accepting commands.
    fn forget_closed(&self, token: &RoomToken) {
        self.rooms.remove_if(token, |_, handle| handle.tx.is_closed());
    }
}
