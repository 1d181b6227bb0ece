//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Adds a std duration, saturating at the largest representable instant.
    pub fn plus(&self, duration: std::time::Duration) -> Self {
        Duration::from_std(duration)
            .ok()
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
            .unwrap_or(Self(DateTime::<Utc>::MAX_UTC))
    }

    /// Current time, bumped forward if needed so it is strictly after `floor`.
    ///
    /// Wall clocks may repeat or step backwards; message ordering must not.
    /// Precision is one microsecond, the finest unit every store keeps.
    pub fn now_after(floor: Option<&Timestamp>) -> Self {
        let now = Self::now().truncated_to_micros();
        match floor {
            Some(floor) if !now.is_after(floor) => {
                Self(floor.truncated_to_micros().0 + Duration::microseconds(1))
            }
            _ => now,
        }
    }

    fn truncated_to_micros(self) -> Self {
        let micros = self.0.timestamp_subsec_micros();
        let nanos = self.0.timestamp_subsec_nanos();
        Self(self.0 - Duration::nanoseconds(i64::from(nanos - micros * 1_000)))
    }
}
