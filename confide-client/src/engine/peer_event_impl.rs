use confide_core::{ConnectionStatus, SignalMessage};
use tracing::{debug, info};

use crate::ClientError;
use crate::engine::Negotiator;
use crate::peer::{PeerEvent, PeerEventKind, RemoteStream, TransportState};

impl Negotiator {
    pub async fn handle_peer_event(&mut self, event: PeerEvent) -> Result<(), ClientError> {
        if self.peer.is_none() || event.generation != self.generation {
            debug!(
                "Dropping event from stale peer connection #{}",
                event.generation
            );
            return Ok(());
        }

        match event.kind {
            PeerEventKind::LocalCandidate(candidate) => {
                self.signals.send(SignalMessage::Candidate(candidate))?;
            }

            PeerEventKind::RemoteTrack(track) => {
                info!("Remote {:?} track {}", track.kind, track.id);
                self.remote.send_modify(|remote| match remote {
                    Some(stream) if stream.id == track.stream_id => {
                        if !stream.tracks.iter().any(|t| t.id == track.id) {
                            stream.tracks.push(track);
                        }
                    }
                    _ => {
                        *remote = Some(RemoteStream {
                            id: track.stream_id.clone(),
                            tracks: vec![track],
                        });
                    }
                });
                self.set_status(ConnectionStatus::Connected);
            }

            PeerEventKind::TransportState(state) => match state {
                TransportState::Connected => self.set_status(ConnectionStatus::Connected),
                TransportState::Failed | TransportState::Disconnected => {
                    self.set_status(ConnectionStatus::Disconnected)
                }
                _ => {}
            },
        }
        Ok(())
    }
}
