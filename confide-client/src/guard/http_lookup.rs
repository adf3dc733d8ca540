use async_trait::async_trait;
use confide_core::RoomToken;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::LookupError;
use crate::guard::{BookingLookup, RoomStatus};

/// Asks the booking service at `{base}/api/rooms/{token}/status`.
#[derive(Clone)]
pub struct HttpBookingLookup {
    http: Client,
    base: Url,
}

impl HttpBookingLookup {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, LookupError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn status_url(&self, room: &RoomToken) -> Result<Url, LookupError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Malformed(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(["api", "rooms", room.as_str(), "status"]);
        Ok(url)
    }
}

#[async_trait]
impl BookingLookup for HttpBookingLookup {
    async fn room_status(&self, room: &RoomToken) -> Result<Option<RoomStatus>, LookupError> {
        let url = self.status_url(room)?;
        debug!("Looking up {}", url);

        let res = self.http.get(url).send().await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = res.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| LookupError::Malformed(e.to_string()))
    }
}
