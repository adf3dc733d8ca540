use clap::{ArgAction, Args};
use confide_core::IceServerConfig;
use confide_core::utils::default_stun_urls;
use std::time::Duration;
use url::Url;

use crate::ClientError;

#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// WebSocket signaling endpoint; the room token is appended as `?room=`.
    #[arg(
        long,
        env = "CONFIDE_SIGNALING_URL",
        default_value = "ws://localhost:8080/api/ws"
    )]
    pub signaling_url: String,

    /// Base URL of the booking service answering room-status lookups.
    #[arg(long, env = "CONFIDE_BOOKING_URL", default_value = "http://localhost:8080")]
    pub booking_url: String,

    /// STUN/TURN URLs. The public STUN set is used when empty.
    #[arg(long = "ice-server", env = "CONFIDE_ICE_SERVERS", value_delimiter = ',')]
    pub ice_servers: Vec<String>,

    /// Interval between keep-alive pings on the signaling channel.
    #[arg(long, env = "CONFIDE_KEEPALIVE_SECS", default_value_t = 25)]
    pub keepalive_secs: u64,

    /// Grant access when the booking service cannot be reached.
    #[arg(long, env = "CONFIDE_FAIL_OPEN", default_value_t = true, action = ArgAction::Set)]
    pub fail_open: bool,

    #[arg(long, env = "CONFIDE_LOOKUP_TIMEOUT_SECS", default_value_t = 5)]
    pub lookup_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://localhost:8080/api/ws".to_string(),
            booking_url: "http://localhost:8080".to_string(),
            ice_servers: Vec::new(),
            keepalive_secs: 25,
            fail_open: true,
            lookup_timeout_secs: 5,
        }
    }
}

impl ClientConfig {
    pub fn signaling_endpoint(&self) -> Result<Url, ClientError> {
        Ok(Url::parse(&self.signaling_url)?)
    }

    pub fn booking_endpoint(&self) -> Result<Url, ClientError> {
        Ok(Url::parse(&self.booking_url)?)
    }

    pub fn ice_server_configs(&self) -> Vec<IceServerConfig> {
        let urls = if self.ice_servers.is_empty() {
            default_stun_urls()
        } else {
            self.ice_servers.clone()
        };
        vec![IceServerConfig {
            urls,
            username: None,
            credential: None,
        }]
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs.max(1))
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs.max(1))
    }
}
