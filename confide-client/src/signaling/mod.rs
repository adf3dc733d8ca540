//! Client side of the signaling channel.

mod channel;

pub use channel::{ChannelEvent, ChannelSender, SignalingChannel};

use confide_core::SignalMessage;

use crate::ClientError;

/// Outbound half of a signaling channel as seen by the negotiation engine.
pub trait SignalSender: Send + Sync {
    fn send(&self, msg: SignalMessage) -> Result<(), ClientError>;
}
