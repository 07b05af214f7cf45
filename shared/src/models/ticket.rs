//! Ticket Model (排队票)

use serde::{Deserialize, Serialize};

/// Ticket lifecycle status
///
/// `waiting -> serving -> done` is the normal path; `serving -> canceled`
/// is the no-show path. `done` and `canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TicketStatus {
    Waiting,
    Serving,
    Done,
    Canceled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Serving => "serving",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticket record - one visitor's place in a (store, service, day) queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ticket {
    pub id: i64,
    /// Opaque 12-hex public handle, used in status URLs and QR codes
    pub public_id: String,
    pub store_id: String,
    /// Service letter (single uppercase A-Z)
    pub service: String,
    /// Local business day ("YYYY-MM-DD") the ticket belongs to
    pub ymd: String,
    /// Position in the day's sequence for this service, starting at 1
    pub number: i64,
    /// Display code: service letter + zero-padded number (e.g. "A003")
    pub code: String,
    pub status: TicketStatus,
    /// Booth that called this ticket, set on call
    pub booth_id: Option<String>,
    pub created_at: i64,
    pub called_at: Option<i64>,
    pub finished_at: Option<i64>,
}

/// Issue ticket payload (kiosk)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCreate {
    pub store_id: String,
    /// Service letter (single uppercase A-Z)
    pub service: String,
}

/// Finish-by-code payload (staff panel)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketFinish {
    /// Display code as shown on the ticket (e.g. "A003")
    pub code: String,
}
