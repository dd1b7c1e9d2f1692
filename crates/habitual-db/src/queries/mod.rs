pub mod executions;
pub mod goals;
pub mod habits;
pub mod weekly_plan;
