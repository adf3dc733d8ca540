use confide_core::{SessionDescription, SignalingState};
use tracing::{debug, info, warn};

use crate::engine::Negotiator;

impl Negotiator {
    /// Applies the answer to our offer. Late or duplicate answers are ignored.
    pub async fn handle_answer(&mut self, answer: SessionDescription) {
        let Some(peer) = self.peer.clone() else {
            warn!("Answer received without a peer connection, ignored");
            return;
        };

        if peer.signaling_state() == SignalingState::Stable {
            debug!("Already stable, ignoring answer");
            return;
        }

        if let Err(e) = peer.set_remote_description(answer).await {
            warn!("Negotiation conflict: remote answer rejected: {:#}", e);
            return;
        }
        info!("Remote answer applied");

        self.drain_candidates().await;
    }
}
