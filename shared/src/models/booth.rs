//! Booth Model (柜台/窗口)

use serde::{Deserialize, Serialize};

/// Booth entity - a serving position bound to one service letter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Booth {
    /// Provisioned short ID (e.g. "S1-A")
    pub id: String,
    pub store_id: String,
    /// Display name (e.g. "Loket 1")
    pub name: String,
    /// Service letter this booth serves (single uppercase A-Z)
    pub service: String,
    pub created_at: i64,
}

/// Create booth payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoothCreate {
    /// Provisioned short ID; generated when omitted
    pub id: Option<String>,
    pub store_id: String,
    pub name: String,
    pub service: String,
}

/// Per-day booth availability row.
///
/// Absence of a row means the booth is open and available; flags only
/// exist once staff toggle them, and reset implicitly at the day boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BoothStatus {
    pub booth_id: String,
    /// Local business day ("YYYY-MM-DD")
    pub ymd: String,
    /// Staff signed in at this booth today
    pub is_active: bool,
    /// Booth accepts new calls (false while paused)
    pub available: bool,
    pub updated_at: i64,
}

/// Update booth availability payload - omitted flags keep their value
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoothStatusUpdate {
    pub is_active: Option<bool>,
    pub available: Option<bool>,
}

/// Booth joined with its effective flags for a given day.
///
/// Missing `booth_status` rows surface here as `true`/`true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BoothWithStatus {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub service: String,
    pub created_at: i64,
    pub is_active: bool,
    pub available: bool,
}
