//! Calendar-day value type.
//!
//! Completion records are keyed by day, never by instant. Every date that
//! crosses the API boundary is turned into a [`CalendarDay`] first, which
//! discards any time-of-day component.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use habitual_db::models::Weekday;

/// Layouts accepted in addition to RFC 3339 and plain `YYYY-MM-DD`.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DayParseError {
    #[error("date is empty")]
    Empty,

    #[error("invalid date {0:?} (expected YYYY-MM-DD, optionally followed by a time)")]
    Invalid(String),
}

/// A date without time of day or timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The current UTC day.
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn weekday(self) -> Weekday {
        Weekday::of(self.0)
    }

    /// Midnight UTC at the start of this day (inclusive bound).
    pub fn start_utc(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::default()))
    }

    /// Midnight UTC at the start of the next day (exclusive bound).
    pub fn end_utc(self) -> DateTime<Utc> {
        let next = self.0.succ_opt().unwrap_or(NaiveDate::MAX);
        Utc.from_utc_datetime(&next.and_time(NaiveTime::default()))
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<DateTime<Utc>> for CalendarDay {
    fn from(ts: DateTime<Utc>) -> Self {
        Self(ts.date_naive())
    }
}

impl FromStr for CalendarDay {
    type Err = DayParseError;

    /// Keeps the date portion exactly as written; an explicit offset is not
    /// applied, so `2026-01-20T23:59:00-03:00` is still the 20th.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DayParseError::Empty);
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(ts.date_naive()));
        }
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|ts| Self(ts.date()))
            .ok_or_else(|| DayParseError::Invalid(s.to_owned()))
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
