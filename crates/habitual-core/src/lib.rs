//! Weekly habit planning and daily completion tracking.
//!
//! A fixed weekly plan (weekday -> habits) is combined with date-stamped
//! completion records to answer "what should I do today, and what have I
//! already done". Each concern is a small service over an injected store:
//!
//! - [`registry::HabitRegistry`]: habit definitions.
//! - [`plan::WeeklyPlan`]: weekday membership toggles and replication.
//! - [`execution::ExecutionLog`]: per-day completion toggles.
//! - [`reconcile::Reconciler`]: the read-only initial-load aggregate.
//! - [`goals::GoalList`]: independent one-off goals scoped by day.

pub mod day;
pub mod error;
pub mod execution;
pub mod goals;
pub mod plan;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod tracker;

pub use day::{CalendarDay, DayParseError};
pub use error::{Result, TrackerError};
pub use habitual_db::models::{Goal, Habit, Weekday};
pub use tracker::Tracker;
