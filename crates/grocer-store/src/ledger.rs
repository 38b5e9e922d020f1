//! # Inventory Ledger
//!
//! The store's shared stock map.
//!
//! ## Access Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     InventoryLedger (RwLock<HashMap>)                   │
//! │                                                                         │
//! │  Shopper #1 ──take("Milk", 2)──┐                                        │
//! │                                │   WRITE lock: one at a time            │
//! │  Shopper #2 ──take("Milk", 4)──┼──────────────▶ ┌──────────────────┐   │
//! │                                │                │ Milk   qty 3     │   │
//! │  Restock   ──add(Milk +2)──────┘                │ Bread  qty 10    │   │
//! │                                                 │ ...              │   │
//! │  Anyone    ──query("Milk")─────── READ lock ──▶ └──────────────────┘   │
//! │                                    (shared)                             │
//! │                                                                         │
//! │  Every lock is held for exactly one lookup/update; nothing else is     │
//! │  called while it is held.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Take Semantics
//! A take grants `min(available, requested)` and decrements stock in the same
//! critical section. Concurrent takers of the same item collectively receive
//! exactly the stock that was there: nothing lost, nothing duplicated. A
//! taker can legitimately get less than it asked for if others emptied the
//! shelf first.

use std::collections::HashMap;
use std::sync::RwLock;

use grocer_core::{Item, Money};
use tracing::{debug, error, warn};

use crate::error::{StoreError, StoreResult};
use crate::lock;

/// The store's shared, lock-guarded stock of items keyed by name.
#[derive(Debug, Default)]
pub struct InventoryLedger {
    stock: RwLock<HashMap<String, Item>>,
}

impl InventoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds stock.
    ///
    /// ## Rules
    /// - Name not stocked yet → inserted as-is
    /// - Name stocked → replaced by `merge(existing, item)`, but ONLY if the
    ///   merged quantity stays ≥ 0; otherwise the add is rejected and the
    ///   existing stock is left untouched
    ///
    /// Returns the item now on the shelf (merged, inserted, or the preserved
    /// existing one). Repricing is an add with quantity zero.
    ///
    /// A merge whose quantity would overflow is an `Err`, and the existing
    /// stock is left untouched.
    pub fn add(&self, item: Item) -> StoreResult<Item> {
        check_name(item.name())?;

        let mut stock = lock::write(&self.stock);
        match stock.get(item.name()) {
            Some(existing) => {
                let merged = Item::try_merge(existing, &item).map_err(|err| {
                    error!(item = %item.name(), error = %err, "Rejected add");
                    err
                })?;
                if merged.quantity() >= 0 {
                    stock.insert(merged.name().to_string(), merged.clone());
                    Ok(merged)
                } else {
                    warn!(
                        item = %item.name(),
                        stocked = existing.quantity(),
                        delta = item.quantity(),
                        "Rejected add that would drive stock negative"
                    );
                    Ok(existing.clone())
                }
            }
            None => {
                stock.insert(item.name().to_string(), item.clone());
                Ok(item)
            }
        }
    }

    /// Looks up the current stock for `name`.
    pub fn query(&self, name: &str) -> Option<Item> {
        lock::read(&self.stock).get(name).cloned()
    }

    /// Takes up to `requested` units of `name`.
    ///
    /// Returns `Ok(None)` if the item is not stocked at all, otherwise the
    /// granted item (same name, price, and unit; granted quantity). The grant
    /// may be zero if the shelf is empty.
    ///
    /// ## Example
    /// ```rust
    /// use grocer_core::{Item, Money};
    /// use grocer_store::InventoryLedger;
    ///
    /// let ledger = InventoryLedger::new();
    /// ledger.add(Item::new("Milk", Money::from_cents(299), 3, "Gallon")).unwrap();
    ///
    /// let granted = ledger.take("Milk", 4).unwrap().unwrap();
    /// assert_eq!(granted.quantity(), 3);
    /// assert_eq!(ledger.query("Milk").unwrap().quantity(), 0);
    /// ```
    pub fn take(&self, name: &str, requested: i64) -> StoreResult<Option<Item>> {
        check_name(name)?;
        if requested <= 0 {
            error!(item = %name, requested, "Take requested a non-positive quantity");
            return Err(StoreError::InvalidQuantity {
                item: name.to_string(),
                quantity: requested,
            });
        }

        let mut stock = lock::write(&self.stock);
        let Some(stocked) = stock.get(name) else {
            return Ok(None);
        };

        let available = stocked.quantity();
        let granted = if available < requested {
            available.max(0)
        } else {
            requested
        };

        let remaining = stocked.with_quantity(available - granted);
        let grant = stocked.with_quantity(granted);
        stock.insert(name.to_string(), remaining);
        drop(stock);

        debug!(item = %name, requested, granted, "Took item from stock");
        Ok(Some(grant))
    }

    /// Copy of every stocked item, sorted by name.
    pub fn snapshot(&self) -> Vec<Item> {
        let mut items: Vec<Item> = lock::read(&self.stock).values().cloned().collect();
        items.sort_by(|a, b| a.name().cmp(b.name()));
        items
    }

    /// Number of distinct item names stocked.
    pub fn len(&self) -> usize {
        lock::read(&self.stock).len()
    }

    pub fn is_empty(&self) -> bool {
        lock::read(&self.stock).is_empty()
    }

    /// Total units across every item, saturating at `i64::MAX`.
    pub fn total_units(&self) -> i64 {
        lock::read(&self.stock)
            .values()
            .map(Item::quantity)
            .fold(0i64, i64::saturating_add)
    }

    /// Value of everything on the shelves at current prices.
    pub fn stock_value(&self) -> Money {
        lock::read(&self.stock).values().map(Item::line_total).sum()
    }
}

fn check_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        error!(item = ?name, "Ledger called with a malformed item name");
        return Err(StoreError::MalformedItemName(name.to_string()));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
