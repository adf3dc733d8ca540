use chrono::NaiveDateTime;
use confide_core::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("signaling transport failed: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("signaling channel is closed")]
    ChannelClosed,

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("peer connection failed: {0:#}")]
    Peer(anyhow::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        ClientError::Peer(err)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("camera/microphone access was denied")]
    PermissionDenied,

    #[error("no capture device available")]
    NoDevices,

    #[error("capture failed: {0}")]
    Capture(String),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("booking service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("booking service answered {0}")]
    Status(u16),

    #[error("malformed booking response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("no session exists for this room")]
    NotFound,

    #[error("session is not open: {reason}")]
    NotApproved { reason: String },

    #[error("session scheduled at {schedule_time} has expired")]
    Expired { schedule_time: NaiveDateTime },

    #[error("could not verify session: {0}")]
    Backend(#[from] LookupError),
}
