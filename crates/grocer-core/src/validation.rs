//! # Validation Module
//!
//! Item construction rules.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Boundary                                │
//! │                                                                         │
//! │  Catalog / seed data / tests                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Item::validated(...) ── THIS MODULE ── rejects bad names, prices      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Ledger, Shopper, Register                                             │
//! │  └── consume already-valid Items; never re-validate                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantity is deliberately NOT range-checked: negative quantities are
//! legal "taking" deltas and deficits.

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_NAME_LEN, MAX_UNIT_LABEL_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name.
///
/// ## Rules
/// - Must not be empty or whitespace only
/// - At most 100 characters
/// - No control characters
///
/// ```rust
/// use grocer_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Orange Juice").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    validate_label("name", name, MAX_ITEM_NAME_LEN)
}

/// Validates a unit label ("Gallon", "Lb", "jar").
pub fn validate_unit_label(unit_label: &str) -> ValidationResult<()> {
    validate_label("unit_label", unit_label, MAX_UNIT_LABEL_LEN)
}

fn validate_label(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    if value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price. Zero is a legitimate price (freebies).
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "unit_price".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
