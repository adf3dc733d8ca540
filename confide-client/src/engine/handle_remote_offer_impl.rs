use confide_core::{SessionDescription, SignalMessage, SignalingState};
use tracing::{info, warn};

use crate::ClientError;
use crate::engine::Negotiator;

impl Negotiator {
    /// Applies a remote offer and answers it.
    ///
    /// An offer that arrives in a state where it cannot be applied is logged
    /// and dropped; there is no glare resolution between the two roles.
    pub async fn handle_offer(&mut self, offer: SessionDescription) -> Result<(), ClientError> {
        let peer = self.create_peer().await?;

        let state = peer.signaling_state();
        if !matches!(
            state,
            SignalingState::Stable | SignalingState::HaveRemoteOffer
        ) {
            warn!("Negotiation conflict: offer received in {:?}, ignored", state);
            return Ok(());
        }

        if let Err(e) = peer.set_remote_description(offer).await {
            warn!("Negotiation conflict: remote offer rejected: {:#}", e);
            return Ok(());
        }

        let answer = match peer.create_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Negotiation conflict: could not create answer: {:#}", e);
                return Ok(());
            }
        };
        if let Err(e) = peer.set_local_description(answer.clone()).await {
            warn!("Negotiation conflict: local answer rejected: {:#}", e);
            return Ok(());
        }

        info!("Sending answer");
        self.signals.send(SignalMessage::Answer(answer))?;

        self.drain_candidates().await;
        Ok(())
    }
}
