//! Error taxonomy shared by every service.

use uuid::Uuid;

use habitual_db::models::WeekdayParseError;

use crate::day::DayParseError;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Malformed or missing input. Raised before storage is touched.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// The store failed (timeout, lost connection, ...). Every write is
    /// atomic, so the caller may retry.
    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

impl TrackerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn habit_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "habit",
            id,
        }
    }

    pub fn goal_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "goal", id }
    }

    pub fn unknown_habit(id: Uuid) -> Self {
        Self::Validation(format!("unknown habit {id}"))
    }
}

impl From<WeekdayParseError> for TrackerError {
    fn from(err: WeekdayParseError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<DayParseError> for TrackerError {
    fn from(err: DayParseError) -> Self {
        Self::Validation(err.to_string())
    }
}
