//! PostgreSQL persistence for habitual: row models, connection pool,
//! embedded migrations and per-table query functions.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
