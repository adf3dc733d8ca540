use async_trait::async_trait;
use confide_core::MediaKind;
use uuid::Uuid;

use crate::MediaError;
use crate::media::{LocalTrack, MediaConstraints, MediaSource};

/// Hands out sample-fed tracks; an encoder pipeline writes frames into them.
#[derive(Debug, Clone, Default)]
pub struct SampleTrackSource;

#[async_trait]
impl MediaSource for SampleTrackSource {
    async fn open(&self, constraints: MediaConstraints) -> Result<Vec<LocalTrack>, MediaError> {
        let stream_id = format!("confide-{}", Uuid::new_v4());
        let mut tracks = Vec::new();
        if constraints.audio {
            tracks.push(LocalTrack::new(MediaKind::Audio, "audio", stream_id.clone()));
        }
        if constraints.video {
            tracks.push(LocalTrack::new(MediaKind::Video, "video", stream_id));
        }
        Ok(tracks)
    }
}

/// A source with nothing to capture, as when permission is denied.
#[derive(Debug, Clone)]
pub struct NoCapture(pub MediaError);

impl Default for NoCapture {
    fn default() -> Self {
        Self(MediaError::NoDevices)
    }
}

#[async_trait]
impl MediaSource for NoCapture {
    async fn open(&self, _constraints: MediaConstraints) -> Result<Vec<LocalTrack>, MediaError> {
        Err(self.0.clone())
    }
}
