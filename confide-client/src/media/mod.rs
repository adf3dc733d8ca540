//! Local camera/microphone capture.
//!
//! Muting and camera-off never remove a track: they flip its `enabled` flag,
//! so the negotiated session stays valid and no renegotiation is needed.

mod sample_source;

pub use sample_source::{NoCapture, SampleTrackSource};

use async_trait::async_trait;
use bytes::Bytes;
use confide_core::MediaKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use crate::MediaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// Something that can hand out capture tracks, such as a device backend.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn open(&self, constraints: MediaConstraints) -> Result<Vec<LocalTrack>, MediaError>;
}

/// One captured track. Clones share the same enabled/live flags.
#[derive(Clone)]
pub struct LocalTrack {
    kind: MediaKind,
    enabled: Arc<AtomicBool>,
    live: Arc<AtomicBool>,
    rtc: Arc<TrackLocalStaticSample>,
}

impl LocalTrack {
    pub fn new(kind: MediaKind, id: impl Into<String>, stream_id: impl Into<String>) -> Self {
        let mime_type = match kind {
            MediaKind::Audio => MIME_TYPE_OPUS,
            MediaKind::Video => MIME_TYPE_VP8,
        };
        let codec = RTCRtpCodecCapability {
            mime_type: mime_type.to_owned(),
            ..Default::default()
        };

        Self {
            kind,
            enabled: Arc::new(AtomicBool::new(true)),
            live: Arc::new(AtomicBool::new(true)),
            rtc: Arc::new(TrackLocalStaticSample::new(codec, id.into(), stream_id.into())),
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        self.rtc.id()
    }

    pub fn stream_id(&self) -> &str {
        self.rtc.stream_id()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn rtc_track(&self) -> Arc<TrackLocalStaticSample> {
        self.rtc.clone()
    }

    /// Pushes one encoded frame. Frames are dropped while the track is
    /// disabled or stopped; returns whether it was written.
    pub async fn write_sample(&self, data: Bytes, duration: Duration) -> anyhow::Result<bool> {
        if !self.is_live() || !self.is_enabled() {
            return Ok(false);
        }
        let sample = Sample {
            data,
            duration,
            ..Default::default()
        };
        self.rtc.write_sample(&sample).await?;
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalMediaState {
    pub stream_id: Option<String>,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub receive_only: bool,
}

/// Owner of the local stream for one session.
pub struct MediaCapture {
    source: Arc<dyn MediaSource>,
    tracks: Vec<LocalTrack>,
    state: watch::Sender<LocalMediaState>,
}

impl MediaCapture {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        let (state, _) = watch::channel(LocalMediaState {
            receive_only: true,
            ..Default::default()
        });
        Self {
            source,
            tracks: Vec::new(),
            state,
        }
    }

    /// Requests camera and microphone. A failure leaves the capture in
    /// receive-only mode; it is reported but does not stop the session.
    pub async fn acquire(&mut self) -> Result<(), MediaError> {
        match self.source.open(MediaConstraints::default()).await {
            Ok(tracks) if !tracks.is_empty() => {
                info!("Acquired {} local track(s)", tracks.len());
                self.tracks = tracks;
                self.publish();
                Ok(())
            }
            Ok(_) => {
                warn!("Capture returned no tracks, continuing receive-only");
                self.publish();
                Err(MediaError::NoDevices)
            }
            Err(e) => {
                warn!("Media acquisition failed ({}), continuing receive-only", e);
                self.publish();
                Err(e)
            }
        }
    }

    /// Handles to the live tracks, for attaching to a peer connection.
    pub fn tracks(&self) -> Vec<LocalTrack> {
        self.tracks.iter().filter(|t| t.is_live()).cloned().collect()
    }

    pub fn is_receive_only(&self) -> bool {
        self.tracks().is_empty()
    }

    pub fn toggle_audio(&self) -> bool {
        self.toggle(MediaKind::Audio)
    }

    pub fn toggle_video(&self) -> bool {
        self.toggle(MediaKind::Video)
    }

    pub fn set_enabled(&self, kind: MediaKind, enabled: bool) {
        for track in self.tracks.iter().filter(|t| t.kind() == kind) {
            track.set_enabled(enabled);
        }
        self.publish();
    }

    /// Returns whether a live track of `kind` is now enabled; always `false`
    /// when nothing of that kind was captured.
    fn toggle(&self, kind: MediaKind) -> bool {
        self.set_enabled(kind, !self.is_enabled(kind));
        self.is_enabled(kind)
    }

    fn is_enabled(&self, kind: MediaKind) -> bool {
        self.tracks
            .iter()
            .any(|t| t.kind() == kind && t.is_live() && t.is_enabled())
    }

    pub fn state(&self) -> LocalMediaState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocalMediaState> {
        self.state.subscribe()
    }

    /// Stops every track. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.tracks.iter().any(|t| t.is_live()) {
            info!("Stopping local media");
        }
        for track in &self.tracks {
            track.stop();
        }
        self.publish();
    }

    fn publish(&self) {
        let live = self.tracks();
        let state = LocalMediaState {
            stream_id: live.first().map(|t| t.stream_id().to_string()),
            audio_enabled: self.is_enabled(MediaKind::Audio),
            video_enabled: self.is_enabled(MediaKind::Video),
            receive_only: live.is_empty(),
        };
        self.state.send_replace(state);
    }
}

impl Drop for MediaCapture {
    fn drop(&mut self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}
