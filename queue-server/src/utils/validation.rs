//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so every
//! user-supplied string is checked at the API edge.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Short identifiers: store IDs, booth IDs, usernames
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Ticket display codes ("A003"); generous to allow multi-digit overflow days
pub const MAX_CODE_LEN: usize = 10;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate a service letter: exactly one uppercase ASCII letter (A-Z).
///
/// The letter partitions queues and prefixes every ticket code, so a bad
/// value must be rejected before any counter is touched.
pub fn validate_service_letter(value: &str) -> Result<(), AppError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Ok(()),
        _ => Err(AppError::validation(format!(
            "Service must be a single uppercase letter A-Z, got '{value}'"
        ))),
    }
}

/// Validate a ticket display code: service letter followed by digits ("A003").
pub fn validate_ticket_code(value: &str) -> Result<(), AppError> {
    let valid = value.len() >= 2
        && value.len() <= MAX_CODE_LEN
        && value.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && value.chars().skip(1).all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Ticket code must be a service letter followed by digits, got '{value}'"
        )))
    }
}
