//! # Item Module
//!
//! An `Item` is a named quantity of goods at a unit price. The same type is
//! used for three jobs:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Where Items Live                                │
//! │                                                                         │
//! │  Ledger stock ........ Milk  $2.99  qty  3  Gallon   (what's on shelf)  │
//! │  Shopping list ....... Milk  $2.99  qty  2  Gallon   (what's wanted)    │
//! │  Taking delta ........ Milk  $2.99  qty -2  Gallon   (merge to reduce)  │
//! │                                                                         │
//! │  merge(into, from):  quantities add, `from` wins on price and unit      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are immutable; every change produces a new `Item`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{validate_item_name, validate_unit_label, validate_unit_price};

// =============================================================================
// Item
// =============================================================================

/// An immutable named quantity of goods.
///
/// Equality is structural over all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    name: String,
    unit_price: Money,
    /// May be negative: a deficit, or a "taking" delta.
    quantity: i64,
    unit_label: String,
}

impl Item {
    /// Creates an item without validation.
    ///
    /// Use this for internal deltas and for data that was already validated;
    /// use [`Item::validated`] at the edges.
    pub fn new(
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
        unit_label: impl Into<String>,
    ) -> Self {
        Item {
            name: name.into(),
            unit_price,
            quantity,
            unit_label: unit_label.into(),
        }
    }

    /// Creates an item after checking name, unit label, and price.
    ///
    /// ```rust
    /// use grocer_core::{Item, Money};
    ///
    /// assert!(Item::validated("Milk", Money::from_cents(299), 3, "Gallon").is_ok());
    /// assert!(Item::validated("", Money::from_cents(299), 3, "Gallon").is_err());
    /// ```
    pub fn validated(
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
        unit_label: impl Into<String>,
    ) -> CoreResult<Self> {
        let item = Item::new(name, unit_price, quantity, unit_label);
        validate_item_name(&item.name)?;
        validate_unit_label(&item.unit_label)?;
        validate_unit_price(item.unit_price)?;
        Ok(item)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_label(&self) -> &str {
        &self.unit_label
    }

    /// Same name, price, and unit with a different quantity.
    pub fn with_quantity(&self, quantity: i64) -> Self {
        Item {
            quantity,
            ..self.clone()
        }
    }

    /// The negative-quantity twin of this item, used to reduce a list entry.
    pub fn negated(&self) -> Self {
        self.with_quantity(-self.quantity)
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Merges `from` into `into`, returning a new item.
    ///
    /// ## Rules
    /// - Names differ → `into` is returned unchanged (silent no-op)
    /// - Otherwise quantities add, and price/unit come from `from`
    /// - A negative result is allowed; callers decide whether it makes sense
    /// - The sum saturates at the `i64` bounds; use [`Item::try_merge`]
    ///   where an overflow must not pass unnoticed
    ///
    /// Not commutative: `merge(a, b)` and `merge(b, a)` agree on quantity but
    /// not on price or unit.
    pub fn merge(into: &Item, from: &Item) -> Item {
        if into.name != from.name {
            return into.clone();
        }
        Item {
            name: from.name.clone(),
            unit_price: from.unit_price,
            quantity: into.quantity.saturating_add(from.quantity),
            unit_label: from.unit_label.clone(),
        }
    }

    /// Strict form of [`Item::merge`] for callers that assume both items
    /// name the same product.
    ///
    /// A name mismatch or a quantity that overflows `i64` is an `Err`.
    pub fn try_merge(into: &Item, from: &Item) -> CoreResult<Item> {
        if into.name != from.name {
            return Err(CoreError::ItemNameMismatch {
                into: into.name.clone(),
                from: from.name.clone(),
            });
        }
        let quantity = into.quantity.checked_add(from.quantity).ok_or_else(|| {
            CoreError::QuantityOverflow {
                item: into.name.clone(),
                quantity: into.quantity,
                delta: from.quantity,
            }
        })?;
        Ok(Item {
            quantity,
            ..Item::merge(into, from)
        })
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{} @ {}/{}",
            self.name, self.quantity, self.unit_price, self.unit_label
        )
    }
}

// =============================================================================
// Folding
// =============================================================================

/// Folds a list of items into a name-keyed map, merging repeats.
///
/// Two requests for "Apples" (2 Lb, then 3 Lb) become one 5 Lb entry. The
/// map is ordered by name so iteration is deterministic.
pub fn fold_by_name<I>(items: I) -> BTreeMap<String, Item>
where
    I: IntoIterator<Item = Item>,
{
    let mut folded: BTreeMap<String, Item> = BTreeMap::new();
    for item in items {
        let entry = match folded.get(item.name()) {
            Some(existing) => Item::merge(existing, &item),
            None => item,
        };
        folded.insert(entry.name().to_string(), entry);
    }
    folded
}

// =============================================================================
// Unit Tests
// =============================================================================
