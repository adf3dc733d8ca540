//! The peer-connection capability the negotiation state machine drives.

mod rtc_peer;

pub use rtc_peer::{RtcPeer, RtcPeerFactory};

use async_trait::async_trait;
use confide_core::{IceCandidate, MediaKind, SessionDescription, SignalingState};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::media::LocalTrack;

/// Transport-level state reported by a peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: MediaKind,
}

/// The remote participant's media as surfaced to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteStream {
    pub id: String,
    pub tracks: Vec<RemoteTrack>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PeerEventKind {
    LocalCandidate(IceCandidate),
    RemoteTrack(RemoteTrack),
    TransportState(TransportState),
}

/// An event tagged with the generation of the peer connection that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerEvent {
    pub generation: u64,
    pub kind: PeerEventKind,
}

/// Where a peer connection reports its events.
#[derive(Clone)]
pub struct PeerEventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<PeerEvent>,
}

impl PeerEventSink {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<PeerEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `false` once nobody is listening anymore.
    pub fn emit(&self, kind: PeerEventKind) -> bool {
        self.tx
            .send(PeerEvent {
                generation: self.generation,
                kind,
            })
            .is_ok()
    }
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    fn signaling_state(&self) -> SignalingState;

    async fn has_remote_description(&self) -> bool;

    async fn add_local_track(&self, track: &LocalTrack) -> anyhow::Result<()>;

    /// Negotiates a media section that can only receive `kind`.
    async fn add_receive_only(&self, kind: MediaKind) -> anyhow::Result<()>;

    async fn create_offer(&self) -> anyhow::Result<SessionDescription>;

    async fn create_answer(&self) -> anyhow::Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> anyhow::Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> anyhow::Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> anyhow::Result<()>;

    async fn close(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait PeerFactory: Send + Sync {
    async fn create(&self, events: PeerEventSink) -> anyhow::Result<Arc<dyn PeerConnection>>;
}
