use confide_core::{ConnectionStatus, IceCandidate, SignalingState};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::media::LocalTrack;
use crate::peer::{PeerConnection, PeerEvent, PeerFactory, RemoteStream};
use crate::signaling::SignalSender;

mod create_offer_impl;
mod create_peer_impl;
mod handle_answer_impl;
mod handle_candidate_impl;
mod handle_remote_offer_impl;
mod handle_signal_impl;
mod peer_event_impl;

/// Drives one peer connection through offer/answer using the messages
/// relayed over the signaling channel.
///
/// The negotiator is owned by a single task; every transition goes through
/// `&mut self`. Peer connections report back through the receiver returned
/// by [`Negotiator::new`], and each one is tagged with a generation so that
/// events from a discarded connection are ignored.
pub struct Negotiator {
    factory: Arc<dyn PeerFactory>,
    signals: Arc<dyn SignalSender>,
    events_tx: mpsc::UnboundedSender<PeerEvent>,
    peer: Option<Arc<dyn PeerConnection>>,
    generation: u64,
    pending_candidates: VecDeque<IceCandidate>,
    local_tracks: Vec<LocalTrack>,
    status: watch::Sender<ConnectionStatus>,
    remote: watch::Sender<Option<RemoteStream>>,
}

impl Negotiator {
    pub fn new(
        factory: Arc<dyn PeerFactory>,
        signals: Arc<dyn SignalSender>,
        local_tracks: Vec<LocalTrack>,
    ) -> (Self, mpsc::UnboundedReceiver<PeerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status, _) = watch::channel(ConnectionStatus::Connecting);
        let (remote, _) = watch::channel(None);

        let negotiator = Self {
            factory,
            signals,
            events_tx,
            peer: None,
            generation: 0,
            pending_candidates: VecDeque::new(),
            local_tracks,
            status,
            remote,
        };
        (negotiator, events_rx)
    }

    /// The signaling channel is up; the other participant may not be yet.
    pub fn on_channel_open(&mut self) {
        if *self.status.borrow() == ConnectionStatus::Connecting {
            self.set_status(ConnectionStatus::Waiting);
        }
    }

    /// Closes the current peer connection and forgets everything negotiated
    /// with it.
    pub async fn close(&mut self) {
        self.discard_peer().await;
        self.remote.send_replace(None);
        self.set_status(ConnectionStatus::Disconnected);
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    pub fn remote_stream(&self) -> Option<RemoteStream> {
        self.remote.borrow().clone()
    }

    pub fn subscribe_remote(&self) -> watch::Receiver<Option<RemoteStream>> {
        self.remote.subscribe()
    }

    /// `None` while no peer connection exists.
    pub fn signaling_state(&self) -> Option<SignalingState> {
        self.peer.as_ref().map(|peer| peer.signaling_state())
    }

    pub fn has_peer(&self) -> bool {
        self.peer.is_some()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn set_status(&self, status: ConnectionStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            info!("Connection status: {} -> {}", previous, status);
        }
    }

    async fn discard_peer(&mut self) {
        self.pending_candidates.clear();
        if let Some(peer) = self.peer.take() {
            if let Err(e) = peer.close().await {
                warn!("Closing peer connection #{} failed: {:#}", self.generation, e);
            }
        }
    }
}
