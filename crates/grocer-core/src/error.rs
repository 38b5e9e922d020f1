//! # Error Types
//!
//! Domain-specific error types for grocer-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  grocer-core errors (this file)                                        │
//! │  ├── CoreError        - Invariant violations in item algebra           │
//! │  └── ValidationError  - Item construction failures                     │
//! │                                                                         │
//! │  grocer-store errors (separate crate)                                  │
//! │  └── StoreError       - Misuse of the ledger, bad configuration        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! An empty shelf, a full checkout line, or a closed store are ordinary
//! outcomes. They are modelled as `bool`/`Option` results, never as `Err`.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// These represent programmer mistakes: a correct caller never sees them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two items were merged under the assumption that they named the same
    /// product, but they did not.
    ///
    /// ## When This Occurs
    /// - `Item::try_merge` called with items of different names
    ///
    /// The lenient `Item::merge` never raises this; it returns the `into`
    /// item unchanged instead.
    #[error("Cannot merge item '{from}' into item '{into}': names differ")]
    ItemNameMismatch { into: String, from: String },

    /// A merge whose combined quantity does not fit in an `i64`.
    ///
    /// ## When This Occurs
    /// - `Item::try_merge` adding stock to an already enormous shelf
    #[error("Quantity overflow merging {delta} into {quantity} of '{item}'")]
    QuantityOverflow {
        item: String,
        quantity: i64,
        delta: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Item construction errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., control characters in a name).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
