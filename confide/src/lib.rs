pub use confide_core::model::{PeerId, RoomToken, SignalMessage};

pub mod model {
    pub use confide_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use confide_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use confide_client::*;
}
