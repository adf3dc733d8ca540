mod config;
mod room;
mod router;
mod signaling;

pub use config::ServerConfig;
pub use room::*;
pub use router::{AppState, router, serve, serve_on};
pub use signaling::*;
