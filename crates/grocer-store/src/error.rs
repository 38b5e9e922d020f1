//! # Store Error Types
//!
//! Error types for the store engine.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Ledger misuse  │  │  Configuration  │  │     Domain              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  MalformedName  │  │  InvalidConfig  │  │  Core (item algebra,    │ │
//! │  │  InvalidQuantity│  │  LoadFailed     │  │        validation)      │ │
//! │  │                 │  │  SaveFailed     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  NOT errors: empty shelf, full line, closed store, no registers.       │
//! │  Those come back as Option / bool / Admission values.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use grocer_core::CoreError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type.
///
/// Every variant is a programmer or deployment mistake. None of them is
/// retried.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Ledger Misuse
    // =========================================================================
    /// An item name that can never be stocked (empty or blank).
    #[error("Malformed item name: {0:?}")]
    MalformedItemName(String),

    /// A take request for zero or fewer units.
    #[error("Invalid quantity {quantity} requested for '{item}'")]
    InvalidQuantity { item: String, quantity: i64 },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid store configuration.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Item algebra or validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}
