mod config;
mod engine;
mod error;
pub mod guard;
pub mod media;
pub mod peer;
mod session;
pub mod signaling;

pub use config::ClientConfig;
pub use engine::Negotiator;
pub use error::{AuthorizationError, ClientError, LookupError, MediaError};
pub use session::{CallSession, SessionCommand, SessionDeps, SessionEnd, SessionHandle};
