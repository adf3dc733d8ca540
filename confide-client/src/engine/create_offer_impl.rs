use confide_core::{SignalMessage, SignalingState};
use tracing::{debug, info};

use crate::ClientError;
use crate::engine::Negotiator;

impl Negotiator {
    /// Starts a negotiation. Does nothing if one is already underway.
    pub async fn create_offer(&mut self) -> Result<(), ClientError> {
        let peer = self.create_peer().await?;

        let state = peer.signaling_state();
        if state != SignalingState::Stable {
            debug!("Skipping offer, negotiation already in {:?}", state);
            return Ok(());
        }

        let offer = peer.create_offer().await?;
        peer.set_local_description(offer.clone()).await?;

        info!("Sending offer");
        self.signals.send(SignalMessage::Offer(offer))
    }
}
