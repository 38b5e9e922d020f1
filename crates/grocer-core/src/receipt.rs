//! # Receipt
//!
//! The itemized summary a register hands a shopper at checkout.
//!
//! ## Line Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (insertion order)          Receipt (price desc, then name asc)    │
//! │  ─────────────────────           ──────────────────────────────────     │
//! │  Bananas   $0.99                 Grapes  1 @$2.99/Lb == $2.99           │
//! │  Milk      $2.99         ──►     Milk    1 @$2.99/Gallon == $2.99       │
//! │  Grapes    $2.99                 Bananas 1 @$0.99/Lb == $0.99           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A receipt is built once and never changes afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::Item;
use crate::money::Money;

/// An immutable, deterministically ordered checkout summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Receipt number (UUID v4).
    number: Uuid,
    issued_at: DateTime<Utc>,
    /// Already sorted: unit price descending, then name ascending.
    items: Vec<Item>,
}

impl Receipt {
    /// Builds a receipt from a finalized cart snapshot.
    pub fn from_items(mut items: Vec<Item>) -> Self {
        items.sort_by(|a, b| {
            b.unit_price()
                .cmp(&a.unit_price())
                .then_with(|| a.name().cmp(b.name()))
        });

        Receipt {
            number: Uuid::new_v4(),
            issued_at: Utc::now(),
            items,
        }
    }

    pub fn number(&self) -> Uuid {
        self.number
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Items in receipt order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of every line total.
    pub fn total(&self) -> Money {
        self.items.iter().map(Item::line_total).sum()
    }

    /// The total rendered for display, e.g. `$12.47`.
    pub fn formatted_total(&self) -> String {
        self.total().to_string()
    }

    /// One display line per item, in receipt order.
    ///
    /// Format: `{name} {qty} @{unit price}/{unit} == {line total}`, e.g.
    /// `Milk 2 @$2.99/Gallon == $5.98`
    pub fn itemized_lines(&self) -> Vec<String> {
        self.items.iter().map(format_line).collect()
    }
}

fn format_line(item: &Item) -> String {
    format!(
        "{} {} @{}/{} == {}",
        item.name(),
        item.quantity(),
        item.unit_price(),
        item.unit_label(),
        item.line_total()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, cents: i64, qty: i64, unit: &str) -> Item {
        Item::new(name, Money::from_cents(cents), qty, unit)
    }

    #[test]
    fn test_orders_by_price_descending() {
        let receipt = Receipt::from_items(vec![
            item("Bananas", 99, 1, "LB"),
            item("Grapes", 299, 1, "LB"),
        ]);

        let lines = receipt.itemized_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Grapes"));
        assert!(lines[0].contains("$2.99"));
        assert!(lines[1].starts_with("Bananas"));
        assert!(lines[1].contains("$0.99"));
    }

    #[test]
    fn test_price_ties_break_on_name() {
        let receipt = Receipt::from_items(vec![
            item("Bananas", 99, 1, "LB"),
            item("Milk", 299, 1, "Gallon"),
            item("Grapes", 299, 1, "LB"),
        ]);

        let names: Vec<&str> = receipt.items().iter().map(Item::name).collect();
        assert_eq!(names, vec!["Grapes", "Milk", "Bananas"]);
    }

    #[test]
    fn test_line_format() {
        let receipt = Receipt::from_items(vec![item("Milk", 299, 2, "Gallon")]);
        assert_eq!(
            receipt.itemized_lines(),
            vec!["Milk 2 @$2.99/Gallon == $5.98".to_string()]
        );
    }

    #[test]
    fn test_total_sums_line_totals() {
        for cents in [400, 401, 3, 499] {
            let receipt = Receipt::from_items(vec![
                item("one", cents, 1, "LB"),
                item("two", cents, 2, "LB"),
            ]);
            assert_eq!(receipt.total(), Money::from_cents(cents * 3));

            let formatted = receipt.formatted_total();
            assert!(formatted.starts_with('$'));
            assert_eq!(formatted, Money::from_cents(cents * 3).to_string());
        }
    }

    #[test]
    fn test_empty_receipt() {
        let receipt = Receipt::from_items(Vec::new());
        assert_eq!(receipt.line_count(), 0);
        assert_eq!(receipt.formatted_total(), "$0.00");
    }

    #[test]
    fn test_receipt_numbers_are_unique() {
        let a = Receipt::from_items(Vec::new());
        let b = Receipt::from_items(Vec::new());
        assert_ne!(a.number(), b.number());
    }

    #[test]
    fn test_serializes_to_json() {
        let receipt = Receipt::from_items(vec![item("Milk", 299, 1, "Gallon")]);
        let json = serde_json::to_string(&receipt).unwrap();
        assert!(json.contains("\"unit_price\":299"));

        let back: Receipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, receipt);
    }
}
