//! Calendar month selection for reports and month-scoped ledger reads.

use chrono::{Datelike, FixedOffset, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::Timestamp;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// A calendar month, e.g. March 2025.
///
/// Years are limited to the range representable by [`Timestamp`].
/// Deserialization goes through [`ReportMonth::new`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMonth")]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawMonth> for ReportMonth {
    type Error = ValidationError;

    fn try_from(raw: RawMonth) -> Result<Self, Self::Error> {
        ReportMonth::new(raw.year, raw.month)
    }
}

impl ReportMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::InvalidMonth(month));
        }
        if !(1678..=2261).contains(&year) {
            return Err(ValidationError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The month a timestamp falls in, read at the given UTC offset.
    pub fn containing(ts: Timestamp, offset: FixedOffset) -> Self {
        let dt = ts.at_offset(offset);
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Step forward, but never past `current`.
    pub fn next_until(self, current: ReportMonth) -> Self {
        if self >= current { self } else { self.next() }
    }

    pub fn contains(&self, ts: Timestamp, offset: FixedOffset) -> bool {
        Self::containing(ts, offset) == *self
    }

    fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Inclusive `[start, end]` timestamps of the month at the given offset.
    pub fn bounds(&self, offset: FixedOffset) -> (Timestamp, Timestamp) {
        let start_day = self.first_day();
        let end_day = start_day + Months::new(1);
        let to_ts = |day: NaiveDate| {
            let naive = day.and_hms_opt(0, 0, 0).unwrap_or_default();
            match offset.from_local_datetime(&naive).single() {
                Some(dt) => Timestamp::from_datetime(dt),
                None => Timestamp::from_datetime(naive.and_utc()),
            }
        };
        let start = to_ts(start_day);
        let end = Timestamp::from_nanos(to_ts(end_day).as_nanos() - 1);
        (start, end)
    }

    /// Display label such as `"March 2025"`.
    pub fn label(&self) -> String {
        let name = MONTH_NAMES
            .get((self.month as usize).wrapping_sub(1))
            .copied()
            .unwrap_or("Month");
        format!("{name} {}", self.year)
    }
}

impl core::fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
