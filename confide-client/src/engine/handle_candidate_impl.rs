use confide_core::IceCandidate;
use tracing::debug;

use crate::engine::Negotiator;

impl Negotiator {
    /// Applies a remote candidate, or queues it until a remote description
    /// is in place.
    pub async fn handle_candidate(&mut self, candidate: IceCandidate) {
        let peer = match &self.peer {
            Some(peer) if peer.has_remote_description().await => peer.clone(),
            _ => {
                self.pending_candidates.push_back(candidate);
                debug!("Queued candidate ({} pending)", self.pending_candidates.len());
                return;
            }
        };

        if let Err(e) = peer.add_ice_candidate(candidate).await {
            debug!("Remote candidate not applied: {:#}", e);
        }
    }

    /// Applies every queued candidate in arrival order. Returns how many were
    /// handed to the peer connection.
    pub(super) async fn drain_candidates(&mut self) -> usize {
        let Some(peer) = self.peer.clone() else {
            return 0;
        };

        let mut applied = 0;
        while let Some(candidate) = self.pending_candidates.pop_front() {
            if let Err(e) = peer.add_ice_candidate(candidate).await {
                debug!("Queued candidate not applied: {:#}", e);
            }
            applied += 1;
        }
        if applied > 0 {
            debug!("Drained {} queued candidates", applied);
        }
        applied
    }
}
