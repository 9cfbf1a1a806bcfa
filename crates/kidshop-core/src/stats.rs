//! Date windows for the admin dashboard statistics. All arithmetic is UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsFilter {
    All,
    Today,
    Yesterday,
    Last30Days,
    Month { month: u32, year: i32 },
}

impl StatsFilter {
    /// Resolve the dashboard query parameters into a filter.
    ///
    /// A known `filter` keyword wins; otherwise an explicit month and year
    /// select that month. Anything else means no date restriction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidMonth`] if `month` is outside 1-12.
    pub fn from_query(
        filter: Option<&str>,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Self, CoreError> {
        match filter.map(str::trim) {
            Some("today") => return Ok(Self::Today),
            Some("yesterday") => return Ok(Self::Yesterday),
            Some("30d") => return Ok(Self::Last30Days),
            _ => {}
        }

        if let (Some(month), Some(year)) = (month, year) {
            if !(1..=12).contains(&month) {
                return Err(CoreError::InvalidMonth(month));
            }
            return Ok(Self::Month { month, year });
        }
        Ok(Self::All)
    }

    /// The `[start, end]` window this filter selects relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidMonth`] if a month filter does not name a
    /// real calendar month.
    pub fn date_range(self, now: DateTime<Utc>) -> Result<DateRange, CoreError> {
        let midnight = start_of_day(now.date_naive());
        let range = match self {
            Self::All => DateRange::default(),
            Self::Today => DateRange {
                start: Some(midnight),
                end: None,
            },
            Self::Yesterday => DateRange {
                start: Some(midnight - Duration::days(1)),
                end: Some(midnight - Duration::milliseconds(1)),
            },
            Self::Last30Days => DateRange {
                start: Some(now - Duration::days(30)),
                end: None,
            },
            Self::Month { month, year } => {
                let first =
                    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CoreError::InvalidMonth(month))?;
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                }
                .ok_or(CoreError::InvalidMonth(month))?;
                DateRange {
                    start: Some(start_of_day(first)),
                    end: Some(start_of_day(next) - Duration::milliseconds(1)),
                }
            }
        };
        Ok(range)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Inclusive bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}
