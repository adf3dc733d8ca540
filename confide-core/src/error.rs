use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("room token must not be empty")]
    EmptyRoomToken,

    #[error("malformed signal frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unrecognised schedule time `{0}`")]
    InvalidScheduleTime(String),
}
