//! Domain models for the campus back-office contexts.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Validate field-level constraints before records reach persistence.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Cross-record invariants (availability, per-day uniqueness) are owned by
//!   the repository layer, not by individual models.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod attendance;
pub mod catalog;
pub mod library;
pub mod registry;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Checks the minimal email shape shared by borrower/employee/student records.
pub(crate) fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Returns whether a required text field is empty after trimming.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
