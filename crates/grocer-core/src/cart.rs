//! # Cart
//!
//! A shopper's private, ordered bag of taken items.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Lifecycle                                    │
//! │                                                                         │
//! │  Shopper takes from ledger ──► add(item) ────────► items.push(item)    │
//! │                                                                         │
//! │  Register checks out ────────► items() snapshot ─► Receipt             │
//! │                               clear() ──────────► items.clear()        │
//! │                                                                         │
//! │  Checkout refused ───────────► items() snapshot ─► restock ledger      │
//! │                               clear()                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unlike the shopping list, a cart does NOT fold repeats: two takes of the
//! same item are two entries, exactly as they came off the shelf.

use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::money::Money;

/// Ordered collection of items owned by exactly one shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<Item>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Appends an item.
    pub fn add(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Removes the first entry structurally equal to `item`.
    ///
    /// Returns `false` if no such entry exists.
    pub fn remove(&mut self, item: &Item) -> bool {
        match self.items.iter().position(|i| i == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// A copy of the cart's contents, in insertion order.
    pub fn items(&self) -> Vec<Item> {
        self.items.clone()
    }

    /// Number of entries (not units).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all entries, saturating at the `i64` bounds.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .map(Item::quantity)
            .fold(0i64, i64::saturating_add)
    }

    /// Sum of line totals over all entries.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(Item::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, cents: i64, qty: i64) -> Item {
        Item::new(name, Money::from_cents(cents), qty, "Lb")
    }

    #[test]
    fn test_cart_add_keeps_order_and_repeats() {
        let mut cart = Cart::new();
        cart.add(item("Apples", 299, 2));
        cart.add(item("Grapes", 399, 1));
        cart.add(item("Apples", 299, 1));

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.total_quantity(), 4);
        assert_eq!(cart.items()[0].name(), "Apples");
        assert_eq!(cart.items()[1].name(), "Grapes");
    }

    #[test]
    fn test_cart_remove_first_match_only() {
        let mut cart = Cart::new();
        cart.add(item("Apples", 299, 1));
        cart.add(item("Apples", 299, 1));

        assert!(cart.remove(&item("Apples", 299, 1)));
        assert_eq!(cart.len(), 1);
        assert!(!cart.remove(&item("Grapes", 399, 1)));
    }

    #[test]
    fn test_cart_snapshot_is_a_copy() {
        let mut cart = Cart::new();
        cart.add(item("Apples", 299, 1));

        let snapshot = cart.items();
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_cart_subtotal() {
        let mut cart = Cart::new();
        cart.add(item("Apples", 299, 2));
        cart.add(item("Grapes", 399, 1));
        assert_eq!(cart.subtotal(), Money::from_cents(997));
    }
}
