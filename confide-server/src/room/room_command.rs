use confide_core::{PeerId, SignalMessage};
use tokio::sync::oneshot;

/// Commands a room actor receives from the signaling layer.
#[derive(Debug)]
pub enum RoomCommand {
    /// A freshly opened signaling connection asks to enter the room.
    Join {
        peer_id: PeerId,
        reply: oneshot::Sender<JoinReply>,
    },

    /// An offer, answer or candidate to forward to the other member.
    Relay {
        peer_id: PeerId,
        message: SignalMessage,
    },

    /// The member's signaling connection closed.
    Leave { peer_id: PeerId },

    /// Snapshot of the current membership, in join order.
    Members { reply: oneshot::Sender<Vec<PeerId>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinReply {
    Admitted,
    Full,
    /// The room emptied and is shutting down; the join must go to a new room.
    Retired,
}

/// Outcome of a join as seen by the signaling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Full,
}
