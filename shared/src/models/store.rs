//! Store Model (门店)

use serde::{Deserialize, Serialize};

/// Store entity - one physical location running its own queues
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    /// Provisioned short ID (e.g. "S1")
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

/// Create store payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCreate {
    /// Provisioned short ID; generated when omitted
    pub id: Option<String>,
    pub name: String,
}
