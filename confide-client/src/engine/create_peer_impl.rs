use confide_core::{MediaKind, SignalingState};
use std::sync::Arc;
use tracing::info;

use crate::ClientError;
use crate::engine::Negotiator;
use crate::peer::{PeerConnection, PeerEventSink};

impl Negotiator {
    /// Returns the live peer connection, building a new one if there is none
    /// or the previous one was closed.
    pub async fn create_peer(&mut self) -> Result<Arc<dyn PeerConnection>, ClientError> {
        if let Some(peer) = &self.peer {
            if peer.signaling_state() != SignalingState::Closed {
                return Ok(peer.clone());
            }
        }

        self.generation += 1;
        let sink = PeerEventSink::new(self.generation, self.events_tx.clone());
        let peer = self.factory.create(sink).await?;

        for track in &self.local_tracks {
            peer.add_local_track(track).await?;
        }
        // Without these the offer carries no media sections for a side that
        // has nothing to send, and the remote could not send either.
        for kind in [MediaKind::Audio, MediaKind::Video] {
            if !self.local_tracks.iter().any(|t| t.kind() == kind) {
                peer.add_receive_only(kind).await?;
            }
        }

        info!(
            "Created peer connection #{} ({} local tracks)",
            self.generation,
            self.local_tracks.len()
        );
        self.peer = Some(peer.clone());
        Ok(peer)
    }
}
