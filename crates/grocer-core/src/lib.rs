//! # grocer-core: Pure Domain Values for Grocer
//!
//! This crate holds the value types that flow between shoppers, the store
//! inventory, and the checkout registers. Nothing in here locks, sleeps, or
//! touches the outside world.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Grocer Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/grocer-sim (shopping day)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      grocer-store: Ledger • Register • Shopper • Store          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ grocer-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   item    │  │   cart    │  │  receipt  │  │   │
//! │  │   │   Money   │  │   Item    │  │   Cart    │  │  Receipt  │  │   │
//! │  │   │  (cents)  │  │  merge()  │  │ snapshot  │  │  ordering │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOCKS • NO THREADS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`item`] - Immutable stock/shopping-list entries and their merge rule
//! - [`cart`] - A shopper's private bag of taken items
//! - [`receipt`] - Itemized, ordered checkout summary
//! - [`validation`] - Item construction rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use grocer_core::{Item, Money};
//!
//! let stocked = Item::new("Milk", Money::from_cents(299), 3, "Gallon");
//! let delivery = Item::new("Milk", Money::from_cents(309), 2, "Gallon");
//!
//! // `from` wins on price and unit, quantities add up
//! let merged = Item::merge(&stocked, &delivery);
//! assert_eq!(merged.quantity(), 5);
//! assert_eq!(merged.unit_price(), Money::from_cents(309));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod item;
pub mod money;
pub mod receipt;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use error::{CoreError, CoreResult, ValidationError};
pub use item::{fold_by_name, Item};
pub use money::Money;
pub use receipt::Receipt;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of an item name.
pub const MAX_ITEM_NAME_LEN: usize = 100;

/// Maximum length of a unit label ("Gallon", "Lb", "jar", ...).
pub const MAX_UNIT_LABEL_LEN: usize = 30;
