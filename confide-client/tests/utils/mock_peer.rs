use anyhow::{Result, bail};
use async_trait::async_trait;
use confide_client::media::LocalTrack;
use confide_client::peer::{
    PeerConnection, PeerEventKind, PeerEventSink, PeerFactory, RemoteTrack, TransportState,
};
use confide_core::{IceCandidate, MediaKind, SdpKind, SessionDescription, SignalingState};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MockPeerState {
    signaling: Option<SignalingState>,
    remote_description: Option<SessionDescription>,
    local_description: Option<SessionDescription>,
    applied_candidates: Vec<IceCandidate>,
    local_tracks: Vec<MediaKind>,
    receive_only: Vec<MediaKind>,
    local_candidates: usize,
    closed: bool,
}

/// In-memory peer connection following the offer/answer state rules.
///
/// Setting a local description yields one local candidate; reaching
/// `stable` yields a remote track and a `connected` transport state.
/// Candidates whose text contains `bad` are rejected after being recorded.
pub struct MockPeer {
    sink: PeerEventSink,
    state: Mutex<MockPeerState>,
}

impl MockPeer {
    pub fn new(sink: PeerEventSink) -> Self {
        Self {
            sink,
            state: Mutex::new(MockPeerState {
                signaling: Some(SignalingState::Stable),
                ..Default::default()
            }),
        }
    }

    pub fn generation(&self) -> u64 {
        self.sink.generation()
    }

    /// Candidates handed to this connection, in order.
    pub fn applied_candidates(&self) -> Vec<IceCandidate> {
        self.state.lock().unwrap().applied_candidates.clone()
    }

    pub fn local_tracks(&self) -> Vec<MediaKind> {
        self.state.lock().unwrap().local_tracks.clone()
    }

    pub fn receive_only(&self) -> Vec<MediaKind> {
        self.state.lock().unwrap().receive_only.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.state.lock().unwrap().remote_description.clone()
    }

    pub fn local_description(&self) -> Option<SessionDescription> {
        self.state.lock().unwrap().local_description.clone()
    }

    /// Raises a transport change as if the network had reported it.
    pub fn emit_transport(&self, state: TransportState) {
        self.sink.emit(PeerEventKind::TransportState(state));
    }

    fn current(&self) -> SignalingState {
        self.state
            .lock()
            .unwrap()
            .signaling
            .unwrap_or(SignalingState::Stable)
    }

    fn on_local_description(&self) {
        let n = {
            let mut state = self.state.lock().unwrap();
            state.local_candidates += 1;
            state.local_candidates
        };
        self.sink.emit(PeerEventKind::LocalCandidate(IceCandidate {
            candidate: format!("candidate:gen{}-{}", self.generation(), n),
            sdp_mid: Some("0".to_string()),
            sdp_m_line_index: Some(0),
            username_fragment: None,
        }));
    }

    fn on_stable(&self) {
        self.sink.emit(PeerEventKind::RemoteTrack(RemoteTrack {
            id: format!("remote-video-{}", self.generation()),
            stream_id: format!("remote-stream-{}", self.generation()),
            kind: MediaKind::Video,
        }));
        self.sink
            .emit(PeerEventKind::TransportState(TransportState::Connected));
    }
}

#[async_trait]
impl PeerConnection for MockPeer {
    fn signaling_state(&self) -> SignalingState {
        self.current()
    }

    async fn has_remote_description(&self) -> bool {
        self.state.lock().unwrap().remote_description.is_some()
    }

    async fn add_local_track(&self, track: &LocalTrack) -> Result<()> {
        self.state.lock().unwrap().local_tracks.push(track.kind());
        Ok(())
    }

    async fn add_receive_only(&self, kind: MediaKind) -> Result<()> {
        self.state.lock().unwrap().receive_only.push(kind);
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        match self.current() {
            SignalingState::Closed => bail!("connection closed"),
            _ => Ok(SessionDescription::offer(format!(
                "v=0 offer gen{}",
                self.generation()
            ))),
        }
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        match self.current() {
            SignalingState::HaveRemoteOffer => Ok(SessionDescription::answer(format!(
                "v=0 answer gen{}",
                self.generation()
            ))),
            other => bail!("cannot answer in {:?}", other),
        }
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        let reached_stable = {
            let mut state = self.state.lock().unwrap();
            let current = state.signaling.unwrap_or(SignalingState::Stable);
            let next = match (desc.kind, current) {
                (SdpKind::Offer, SignalingState::Stable) => SignalingState::HaveLocalOffer,
                (SdpKind::Answer, SignalingState::HaveRemoteOffer) => SignalingState::Stable,
                (kind, state) => bail!("local {:?} not allowed in {:?}", kind, state),
            };
            state.signaling = Some(next);
            state.local_description = Some(desc);
            next == SignalingState::Stable
        };

        self.on_local_description();
        if reached_stable {
            self.on_stable();
        }
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        let reached_stable = {
            let mut state = self.state.lock().unwrap();
            let current = state.signaling.unwrap_or(SignalingState::Stable);
            let next = match (desc.kind, current) {
                (SdpKind::Offer, SignalingState::Stable | SignalingState::HaveRemoteOffer) => {
                    SignalingState::HaveRemoteOffer
                }
                (SdpKind::Answer, SignalingState::HaveLocalOffer) => SignalingState::Stable,
                (kind, state) => bail!("remote {:?} not allowed in {:?}", kind, state),
            };
            state.signaling = Some(next);
            state.remote_description = Some(desc);
            next == SignalingState::Stable
        };

        if reached_stable {
            self.on_stable();
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.remote_description.is_none() {
            bail!("no remote description");
        }
        let rejected = candidate.candidate.contains("bad");
        state.applied_candidates.push(candidate);
        if rejected {
            bail!("malformed candidate");
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.signaling = Some(SignalingState::Closed);
        state.closed = true;
        Ok(())
    }
}

/// Hands out [`MockPeer`]s and keeps every one it built.
#[derive(Clone, Default)]
pub struct MockPeerFactory {
    created: Arc<Mutex<Vec<Arc<MockPeer>>>>,
}

impl MockPeerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn latest(&self) -> Option<Arc<MockPeer>> {
        self.created.lock().unwrap().last().cloned()
    }

    pub fn all(&self) -> Vec<Arc<MockPeer>> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PeerFactory for MockPeerFactory {
    async fn create(&self, events: PeerEventSink) -> Result<Arc<dyn PeerConnection>> {
        let peer = Arc::new(MockPeer::new(events));
        self.created.lock().unwrap().push(peer.clone());
        Ok(peer)
    }
}
