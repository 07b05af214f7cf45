//! Shared types for the queue platform
//!
//! Common types used across crates: domain models, message bus
//! payloads, client-facing auth structures, and ID/time utilities.

pub mod client;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType};
