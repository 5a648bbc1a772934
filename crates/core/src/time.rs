//! Ledger timestamps.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Nanoseconds since the Unix epoch, as stamped by the remote ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Saturates at the representable range (years 1677..=2262).
    pub fn from_datetime<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        let nanos = dt.timestamp_nanos_opt().unwrap_or(if dt.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        });
        Self(nanos)
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.0)
    }

    /// Wall-clock time at the given UTC offset.
    pub fn at_offset(self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.to_datetime().with_timezone(&offset)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_datetime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn converts_through_chrono() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 31, 23, 30, 0).unwrap();
        let ts = Timestamp::from(dt);
        assert_eq!(ts.to_datetime(), dt);
    }

    #[test]
    fn offset_moves_the_calendar_day() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 31, 20, 0, 0).unwrap();
        let karachi = FixedOffset::east_opt(5 * 3600).unwrap();
        assert_eq!(Timestamp::from(dt).at_offset(karachi).month(), 4);
    }
}
