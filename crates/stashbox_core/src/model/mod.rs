//! Inventory domain model: collections own boxes, boxes own items.
//!
//! # Responsibility
//! - Define the persisted record shapes for every hierarchy level.
//! - Define the partial-update (merge) shapes used by repositories.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that never changes.
//! - Derived roll-ups (box/collection value and fragility) are not part of
//!   these records; see `crate::aggregate`.
//! - `last_modified` is epoch milliseconds and only moves forward.

pub mod collection;
pub mod item;
pub mod money;
pub mod storage_box;

use chrono::Utc;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use money::Money;

/// Validation failures raised before a record is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trimming whitespace.
    BlankName { entity: &'static str },
    /// Item value is below zero.
    NegativeValue { value: Money },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { entity } => write!(f, "{entity} name must not be blank"),
            Self::NegativeValue { value } => {
                write!(f, "item value must not be negative, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Returns the `last_modified` value for a write that follows `previous`.
///
/// Always strictly greater than `previous`, even when the clock has not
/// advanced (or went backwards) since the last write.
pub fn next_modified(previous: Option<i64>) -> i64 {
    let now = now_epoch_ms();
    match previous {
        Some(previous) if now <= previous => previous.saturating_add(1),
        _ => now,
    }
}

pub(crate) fn validate_name(name: &str, entity: &'static str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankName { entity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{next_modified, now_epoch_ms, validate_name, ValidationError};

    #[test]
    fn next_modified_is_strictly_after_previous() {
        let future = now_epoch_ms() + 60_000;
        assert_eq!(next_modified(Some(future)), future + 1);

        let past = now_epoch_ms() - 60_000;
        assert!(next_modified(Some(past)) > past);
        assert!(next_modified(None) > 0);
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            validate_name("  \t", "item"),
            Err(ValidationError::BlankName { entity: "item" })
        );
        assert!(validate_name("Lamp", "item").is_ok());
    }
}
