//! Data models
//!
//! Shared between queue-server and frontends (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Stores and booths use provisioned TEXT IDs ("S1", "S1-A"); tickets and
//! users use snowflake `i64` IDs. Timestamps are Unix milliseconds.

pub mod booth;
pub mod store;
pub mod ticket;
pub mod user;

// Re-exports
pub use booth::*;
pub use store::*;
pub use ticket::*;
pub use user::*;
