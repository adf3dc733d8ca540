mod peer;
mod room;
mod session;
mod signaling;
mod state;

pub use peer::PeerId;
pub use room::{ROOM_CAPACITY, RoomToken};
pub use session::{
    BookingBucket, BookingStatus, SESSION_EXPIRY_SECS, SessionWindow, parse_schedule_time,
};
pub use signaling::{IceCandidate, IceServerConfig, SdpKind, SessionDescription, SignalMessage};
pub use state::{ConnectionStatus, MediaKind, SignalingState};
