use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Day of the week a habit can be scheduled on.
///
/// Ordering is Monday-first, matching the display order of a weekly plan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All seven weekdays in display order.
    pub const ALL: [Weekday; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    /// Canonical three-letter code, as stored and serialized.
    pub fn code(self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }

    /// Weekday a given date falls on.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Weekday {
    type Err = WeekdayParseError;

    /// Accepts canonical English codes and the Portuguese codes used by
    /// older clients (`seg`..`dom`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mon" | "seg" => Ok(Self::Mon),
            "tue" | "ter" => Ok(Self::Tue),
            "wed" | "qua" => Ok(Self::Wed),
            "thu" | "qui" => Ok(Self::Thu),
            "fri" | "sex" => Ok(Self::Fri),
            "sat" | "sab" => Ok(Self::Sat),
            "sun" | "dom" => Ok(Self::Sun),
            _ => Err(WeekdayParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Weekday`] code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid weekday: {0:?} (expected one of mon, tue, wed, thu, fri, sat, sun)")]
pub struct WeekdayParseError(pub String);

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A habit definition. Carries no recurrence information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Membership of a habit in one weekday of the weekly plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WeeklyPlanEntry {
    pub id: i64,
    pub weekday: Weekday,
    pub habit_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Marks a habit as done on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ExecutionRecord {
    pub id: i64,
    pub day: NaiveDate,
    pub habit_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

/// A one-off goal scheduled for a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub scheduled_for: DateTime<Utc>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_display_roundtrip() {
        for v in Weekday::ALL {
            let parsed: Weekday = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
    }

    #[test]
    fn weekday_accepts_localized_codes() {
        assert_eq!("seg".parse::<Weekday>().unwrap(), Weekday::Mon);
        assert_eq!("sab".parse::<Weekday>().unwrap(), Weekday::Sat);
        assert_eq!("dom".parse::<Weekday>().unwrap(), Weekday::Sun);
    }

    #[test]
    fn weekday_is_case_insensitive() {
        assert_eq!("FRI".parse::<Weekday>().unwrap(), Weekday::Fri);
        assert_eq!(" Wed ".parse::<Weekday>().unwrap(), Weekday::Wed);
    }

    #[test]
    fn weekday_invalid() {
        let err = "monday".parse::<Weekday>().unwrap_err();
        assert!(err.to_string().contains("monday"));
        assert!("".parse::<Weekday>().is_err());
    }

    #[test]
    fn weekday_of_date() {
        let monday = NaiveDate::from_ymd_opt(2026, 1, 19).unwrap();
        assert_eq!(Weekday::of(monday), Weekday::Mon);
        let sunday = NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();
        assert_eq!(Weekday::of(sunday), Weekday::Sun);
    }

    #[test]
    fn weekday_serializes_as_code() {
        let json = serde_json::to_string(&Weekday::Thu).unwrap();
        assert_eq!(json, "\"thu\"");
    }

    #[test]
    fn weekday_orders_monday_first() {
        let mut days = vec![Weekday::Sun, Weekday::Wed, Weekday::Mon];
        days.sort();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]);
    }
}
