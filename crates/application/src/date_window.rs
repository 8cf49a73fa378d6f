//! Default time windows for event listing and creation

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use domain::DateRange;

use crate::error::ApplicationError;

/// Length of the `events` window when no end is given
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Length of a created event when no end is given
pub const DEFAULT_EVENT_MINUTES: i64 = 60;

/// How the user selected the events to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeSelector {
    /// `[now, now + 7 days)`
    #[default]
    Upcoming,
    /// Local midnight today to local midnight tomorrow
    Today,
    /// `--from` and/or `--to`; missing bounds default to now and a week later
    Between {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

impl RangeSelector {
    /// Resolve the selector against `now` in the local time zone
    pub fn resolve(self, now: DateTime<Utc>) -> Result<DateRange, ApplicationError> {
        self.resolve_in(now, &Local)
    }

    /// Resolve the selector against `now`, taking day boundaries from `tz`
    pub fn resolve_in<Tz: TimeZone>(
        self,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<DateRange, ApplicationError> {
        let range = match self {
            Self::Upcoming => DateRange::spanning_days(now, DEFAULT_WINDOW_DAYS)?,
            Self::Today => DateRange::day_containing(now, tz)?,
            Self::Between { from, to } => {
                let start = from.unwrap_or(now);
                match to {
                    Some(end) => DateRange::new(start, end)?,
                    None => DateRange::spanning_days(start, DEFAULT_WINDOW_DAYS)?,
                }
            },
        };
        Ok(range)
    }
}

/// Start and end for a new event: start defaults to now, end to one hour later
#[must_use]
pub fn event_times(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start.unwrap_or(now);
    let end = end.unwrap_or_else(|| start + Duration::minutes(DEFAULT_EVENT_MINUTES));
    (start, end)
}
