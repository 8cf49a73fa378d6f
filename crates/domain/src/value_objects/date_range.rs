//! Half-open date range value object

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::errors::DomainError;

/// Half-open interval `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    ///
    /// `start == end` is allowed and contains nothing.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// The calendar day `date` in time zone `tz`: local midnight to the next
    pub fn day_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<Self, DomainError> {
        let next = date
            .succ_opt()
            .ok_or_else(|| DomainError::InvalidDateTime(format!("no day after {date}")))?;
        Self::new(local_midnight(date, tz)?, local_midnight(next, tz)?)
    }

    /// The day in `tz` that contains `instant`
    pub fn day_containing<Tz: TimeZone>(
        instant: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<Self, DomainError> {
        Self::day_in(instant.with_timezone(tz).date_naive(), tz)
    }

    /// `days` days starting at `start`
    pub fn spanning_days(start: DateTime<Utc>, days: i64) -> Result<Self, DomainError> {
        Self::new(start, start + Duration::days(days))
    }

    /// Inclusive lower bound
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Check whether `instant` lies in `[start, end)`
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Range containing no instant
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Midnight at the start of `date` in `tz`, as UTC
///
/// Where a DST transition skips midnight, the first existing instant of the
/// day is used.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, DomainError> {
    (0..=3)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| tz.from_local_datetime(&date.and_time(time)).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DomainError::InvalidDateTime(format!("no local midnight on {date}")))
}
