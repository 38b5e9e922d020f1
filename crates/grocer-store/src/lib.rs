//! # grocer-store: Concurrent Store Engine
//!
//! Shared inventory, checkout registers, shoppers, and the store that
//! orchestrates them.
//!
//! ## Thread Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Shopper threads (one each)             Service thread (one)          │
//! │   ─────────────────────────              ────────────────────          │
//! │   start_shopper ─────────────┐           service_tick()  (repeat)      │
//! │   take × N ──▶ Ledger        │             • release waiting room      │
//! │   start_shopper_checkout ──▶ Register      • one checkout / register   │
//! │                              │                                         │
//! │                              │           shutdown()      (once)        │
//! │                              └──────────   • stop, drain, close        │
//! │                                                                         │
//! │   The engine never spawns threads. Callers decide how shoppers run.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use grocer_core::{Item, Money};
//! use grocer_store::{Shopper, Store};
//!
//! let store = Arc::new(Store::default());
//! store.add_item(Item::new("Milk", Money::from_cents(299), 3, "Gallon")).unwrap();
//! store.open();
//! store.open_register();
//!
//! let shopper = Arc::new(Shopper::new(
//!     store.clone(),
//!     vec![Item::new("Milk", Money::from_cents(299), 2, "Gallon")],
//! ));
//! shopper.shop();
//! store.service_tick();
//!
//! assert_eq!(shopper.receipt().unwrap().line_count(), 1);
//! assert_eq!(store.query_item("Milk").unwrap().quantity(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod register;
pub mod shopper;
pub mod store;

mod lock;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{SimulationSettings, StoreConfig, StoreSettings};
pub use error::{StoreError, StoreResult};
pub use ledger::InventoryLedger;
pub use register::{Register, RegisterId};
pub use shopper::{Shopper, ShopperId, ShopperPhase};
pub use store::{Admission, RunReport, ShutdownReport, Store, StorePhase, TickReport};
