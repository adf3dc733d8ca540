//! Session Lifecycle Guard: decides whether a participant may enter a room.

mod http_lookup;

pub use http_lookup::HttpBookingLookup;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use clap::ValueEnum;
use confide_core::{RoomToken, SessionWindow, parse_schedule_time};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{AuthorizationError, LookupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Client,
    Counselor,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRole::Client => f.write_str("client"),
            ActorRole::Counselor => f.write_str("counselor"),
        }
    }
}

/// Body of `GET /api/rooms/{token}/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatus {
    pub valid: bool,
    #[serde(default)]
    pub schedule_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[async_trait]
pub trait BookingLookup: Send + Sync {
    /// `Ok(None)` when the booking service does not know the room.
    async fn room_status(&self, room: &RoomToken) -> Result<Option<RoomStatus>, LookupError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time, matching how schedule times are stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub room: RoomToken,
    pub role: ActorRole,
    /// Unknown when access was granted without reaching the booking service.
    pub schedule_time: Option<NaiveDateTime>,
    pub degraded: bool,
}

pub struct SessionGuard {
    lookup: Arc<dyn BookingLookup>,
    clock: Arc<dyn Clock>,
    fail_open: bool,
}

impl SessionGuard {
    pub fn new(lookup: Arc<dyn BookingLookup>, clock: Arc<dyn Clock>, fail_open: bool) -> Self {
        Self {
            lookup,
            clock,
            fail_open,
        }
    }

    pub fn fail_open(&self) -> bool {
        self.fail_open
    }

    /// Grants entry to a live, approved booking no more than an hour past its
    /// scheduled start.
    ///
    /// When the booking service cannot answer, the outcome follows the
    /// fail-open setting.
    pub async fn authorize(
        &self,
        room: &RoomToken,
        role: ActorRole,
    ) -> Result<Authorization, AuthorizationError> {
        let lookup = match self.lookup.room_status(room).await {
            Ok(found) => found,
            Err(e) => return self.on_backend_failure(room, role, e),
        };

        let Some(status) = lookup else {
            info!("Room {} is unknown to the booking service", room);
            return Err(AuthorizationError::NotFound);
        };

        if !status.valid {
            let reason = status
                .reason
                .or(status.status)
                .unwrap_or_else(|| "session is not approved".to_string());
            return Err(AuthorizationError::NotApproved { reason });
        }

        let schedule_time = match status.schedule_time.as_deref().map(parse_schedule_time) {
            Some(Ok(time)) => time,
            Some(Err(e)) => {
                return self.on_backend_failure(room, role, LookupError::Malformed(e.to_string()));
            }
            None => {
                let e = LookupError::Malformed("missing schedule_time".to_string());
                return self.on_backend_failure(room, role, e);
            }
        };

        if SessionWindow::new(schedule_time).is_expired(self.clock.now()) {
            return Err(AuthorizationError::Expired { schedule_time });
        }

        info!("{} admitted to room {} (scheduled {})", role, room, schedule_time);
        Ok(Authorization {
            room: room.clone(),
            role,
            schedule_time: Some(schedule_time),
            degraded: false,
        })
    }

    fn on_backend_failure(
        &self,
        room: &RoomToken,
        role: ActorRole,
        err: LookupError,
    ) -> Result<Authorization, AuthorizationError> {
        if !self.fail_open {
            return Err(AuthorizationError::Backend(err));
        }
        warn!("Booking lookup for room {} failed, admitting anyway: {}", room, err);
        Ok(Authorization {
            room: room.clone(),
            role,
            schedule_time: None,
            degraded: true,
        })
    }
}
