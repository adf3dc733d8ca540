use crate::room::room_command::{JoinReply, RoomCommand};
use crate::signaling::SignalingOutput;
use confide_core::{PeerId, ROOM_CAPACITY, RoomToken, SignalMessage};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Registry entry pointing at a running room actor.
#[derive(Clone)]
pub struct RoomHandle {
    pub(crate) id: u64,
    pub(crate) tx: mpsc::Sender<RoomCommand>,
}

/// Single owner of one room's membership.
///
/// Every join, relay and leave for the token goes through this actor's queue,
/// so membership changes for a room never interleave.
pub struct Room {
    id: u64,
    token: RoomToken,
    members: Vec<PeerId>,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
    rooms: Arc<DashMap<RoomToken, RoomHandle>>,
}

impl Room {
    pub(crate) fn new(
        id: u64,
        token: RoomToken,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
        rooms: Arc<DashMap<RoomToken, RoomHandle>>,
    ) -> Self {
        Self {
            id,
            token,
            members: Vec::with_capacity(ROOM_CAPACITY),
            command_rx,
            signaling,
            rooms,
        }
    }

    pub async fn run(mut self) {
        info!("Room '{}' event loop started", self.token);

        while let Some(cmd) = self.command_rx.recv().await {
            if self.handle_command(cmd).await {
                break;
            }
        }

        let token = self.token.clone();
        self.retire().await;
        info!("Room '{}' event loop finished", token);
    }

    /// Returns `true` once the last member is gone.
    async fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join { peer_id, reply } => {
                let outcome = self.admit(peer_id).await;
                let _ = reply.send(outcome);
                false
            }

            RoomCommand::Relay { peer_id, message } => {
                self.relay(&peer_id, message).await;
                self.members.is_empty()
            }

            RoomCommand::Leave { peer_id } => {
                self.remove_member(&peer_id).await;
                self.members.is_empty()
            }

            RoomCommand::Members { reply } => {
                let _ = reply.send(self.members.clone());
                false
            }
        }
    }

    async fn admit(&mut self, peer_id: PeerId) -> JoinReply {
        if self.members.contains(&peer_id) {
            return JoinReply::Admitted;
        }

        if self.members.len() >= ROOM_CAPACITY {
            info!("Room '{}' is full, refusing {}", self.token, peer_id);
            return JoinReply::Full;
        }

        self.members.push(peer_id.clone());
        info!(
            "Peer {} joined room '{}' ({}/{})",
            peer_id,
            self.token,
            self.members.len(),
            ROOM_CAPACITY
        );

        let others: Vec<PeerId> = self
            .members
            .iter()
            .filter(|id| **id != peer_id)
            .cloned()
            .collect();
        for other in others {
            self.deliver(&other, SignalMessage::PeerJoined).await;
        }

        JoinReply::Admitted
    }

    async fn relay(&mut self, from: &PeerId, message: SignalMessage) {
        if !self.members.contains(from) {
            warn!(
                "Dropping {} from {} which is not a member of room '{}'",
                message.kind(),
                from,
                self.token
            );
            return;
        }

        if !message.is_relayable() {
            warn!("Peer {} tried to relay {}", from, message.kind());
            return;
        }

        debug!("Relaying {} from {} in room '{}'", message.kind(), from, self.token);

        let others: Vec<PeerId> = self
            .members
            .iter()
            .filter(|id| *id != from)
            .cloned()
            .collect();
        for other in others {
            self.deliver(&other, message.clone()).await;
        }
    }

    /// Sends to one member; a member that can no longer be reached is evicted.
    async fn deliver(&mut self, peer_id: &PeerId, message: SignalMessage) {
        let mut pending = vec![(peer_id.clone(), message)];

        while let Some((target, message)) = pending.pop() {
            if !self.members.contains(&target) {
                continue;
            }
            let Err(e) = self.signaling.send_signal(&target, message).await else {
                continue;
            };

            warn!(
                "Evicting {} from room '{}' after failed delivery: {}",
                target, self.token, e
            );
            self.members.retain(|id| *id != target);
            for remaining in &self.members {
                pending.push((remaining.clone(), SignalMessage::PeerLeft));
            }
        }
    }

    async fn remove_member(&mut self, peer_id: &PeerId) {
        let before = self.members.len();
        self.members.retain(|id| id != peer_id);
        if self.members.len() == before {
            return;
        }

        info!("Peer {} left room '{}'", peer_id, self.token);

        let remaining = self.members.clone();
        for other in remaining {
            self.deliver(&other, SignalMessage::PeerLeft).await;
        }
    }

    /// Drops the registry entry and turns away joins that raced with shutdown.
    async fn retire(mut self) {
        self.rooms
            .remove_if(&self.token, |_, handle| handle.id == self.id);
        self.command_rx.close();

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RoomCommand::Join { reply, .. } => {
                    let _ = reply.send(JoinReply::Retired);
                }
                RoomCommand::Members { reply } => {
                    let _ = reply.send(Vec::new());
                }
                RoomCommand::Relay { .. } | RoomCommand::Leave { .. } => {}
            }
        }
    }
}
