use clap::Args;
use std::net::SocketAddr;

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address the signaling server listens on.
    #[arg(long, env = "CONFIDE_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Depth of each room's command queue.
    #[arg(long, env = "CONFIDE_ROOM_BUFFER", default_value_t = 100)]
    pub room_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            room_buffer: 100,
        }
    }
}
