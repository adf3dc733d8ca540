use crate::ProtocolError;
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// How long after its scheduled start a session may still be entered.
pub const SESSION_EXPIRY_SECS: i64 = 60 * 60;

const SCHEDULE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Access window of one booked session.
///
/// The same arithmetic backs both the entry check and the dashboard buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub schedule_time: NaiveDateTime,
    pub expiry_offset: TimeDelta,
}

impl SessionWindow {
    pub fn new(schedule_time: NaiveDateTime) -> Self {
        Self {
            schedule_time,
            expiry_offset: TimeDelta::seconds(SESSION_EXPIRY_SECS),
        }
    }

    /// `now - schedule_time > expiry_offset`. Exactly one hour late still counts as open.
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now.signed_duration_since(self.schedule_time) > self.expiry_offset
    }

    pub fn expires_at(&self) -> NaiveDateTime {
        self.schedule_time + self.expiry_offset
    }
}

/// Parses schedule times as the booking service emits them
/// (`YYYY-MM-DDTHH:MM:SS`, wall-clock local time). RFC 3339 values with an
/// offset are converted to local time.
pub fn parse_schedule_time(raw: &str) -> Result<NaiveDateTime, ProtocolError> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, SCHEDULE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| ProtocolError::InvalidScheduleTime(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// Where a booking is listed on the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingBucket {
    Pending,
    Upcoming,
    History,
    Rejected,
}

impl BookingBucket {
    pub fn classify(status: BookingStatus, schedule_time: NaiveDateTime, now: NaiveDateTime) -> Self {
        match status {
            BookingStatus::Pending => BookingBucket::Pending,
            BookingStatus::Rejected => BookingBucket::Rejected,
            BookingStatus::Completed => BookingBucket::History,
            BookingStatus::Approved => {
                if SessionWindow::new(schedule_time).is_expired(now) {
                    BookingBucket::History
                } else {
                    BookingBucket::Upcoming
                }
            }
        }
    }
}
