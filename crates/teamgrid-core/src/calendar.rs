//! Date helpers for the availability grid.
//!
//! Weeks are Sunday-first: weekday index 0 is Sunday and 6 is Saturday.

use crate::error::{GridError, Result};
use crate::types::Status;
use chrono::{Datelike, Duration, NaiveDate};

/// Number of consecutive dates the grid shows.
pub const WINDOW_DAYS: i64 = 14;

/// How far previous/next navigation moves the window.
pub const PERIOD_WEEKS: i64 = 2;

/// Sunday-first weekday index (0 = Sunday, 6 = Saturday).
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(weekday_index(date), 0 | 6)
}

/// Status of a cell that has no stored record.
pub fn default_status(date: NaiveDate) -> Status {
    if is_weekend(date) {
        Status::Free
    } else {
        Status::Working
    }
}

/// The Sunday that starts the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(weekday_index(date)))
}

/// The first date after `date` that is not a Saturday or Sunday.
pub fn next_weekday(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while is_weekend(next) {
        next += Duration::days(1);
    }
    next
}

pub fn window_dates(start: NaiveDate) -> Vec<NaiveDate> {
    (0..WINDOW_DAYS).map(|i| start + Duration::days(i)).collect()
}

pub fn window_end(start: NaiveDate) -> NaiveDate {
    start + Duration::days(WINDOW_DAYS - 1)
}

/// Every date from `a` to `b` inclusive, ascending, whichever order they are given in.
pub fn dates_between(a: NaiveDate, b: NaiveDate) -> Vec<NaiveDate> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    lo.iter_days().take_while(|d| *d <= hi).collect()
}

/// Parse an ISO date. A trailing time component (`2024-01-05T00:00:00.000Z`) is ignored.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let day = s.split('T').next().unwrap_or(s).trim();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| GridError::InvalidDate(s.to_string()))
}

/// Serde adapter for dates written as `YYYY-MM-DD` and read leniently via [`parse_date`].
pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }

    /// Same formats for an optional field. Pair with `#[serde(default)]`.
    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => crate::calendar::parse_date(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
