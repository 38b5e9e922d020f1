//! # Seed Catalog
//!
//! Built-in shelf stock and shopping lists for a simulated day.
//!
//! Everything here is derived arithmetically from a seed index, so two runs
//! with the same settings stock the same shelves and send in the same
//! shoppers.
//!
//! Each stocked item has:
//! - Name from its aisle
//! - Price: $0.99 - $8.98
//! - Stock: 0 - 11 units

use grocer_core::{CoreResult, Item, Money};

/// Aisles of (item name, unit label).
const AISLES: &[(&str, &[(&str, &str)])] = &[
    (
        "PRODUCE",
        &[
            ("Apples", "Lb"),
            ("Bananas", "Lb"),
            ("Grapes", "Lb"),
            ("Carrots", "Bag"),
            ("Spinach", "Bunch"),
        ],
    ),
    (
        "DAIRY",
        &[
            ("Milk", "Gallon"),
            ("Butter", "Lb"),
            ("Greek Yogurt", "Cup"),
            ("Cheddar Cheese", "Block"),
            ("Eggs", "Dozen"),
        ],
    ),
    (
        "PANTRY",
        &[
            ("Bread", "Loaf"),
            ("Peanut Butter", "Jar"),
            ("Pasta", "Box"),
            ("Rice", "Bag"),
            ("Coffee", "Can"),
        ],
    ),
    (
        "MEAT",
        &[("Steak", "Lb"), ("Chicken", "Lb"), ("Ground Beef", "Lb")],
    ),
    (
        "BEVERAGE",
        &[("Orange Juice", "Gallon"), ("Sparkling Water", "6-Pack")],
    ),
];

/// Every item the store stocks at opening, one per catalog entry.
///
/// Entries go through the same validation as any other incoming stock.
pub fn opening_stock() -> CoreResult<Vec<Item>> {
    entries()
        .enumerate()
        .map(|(seed, (name, unit))| {
            let price_cents = 99 + ((seed * 37) % 800) as i64;
            let quantity = (seed % 12) as i64;
            Item::validated(name, Money::from_cents(price_cents), quantity, unit)
        })
        .collect()
}

/// The shopping list for shopper number `index`: between one and four
/// items, 1 - 3 units each, priced as stocked.
///
/// Lists may name items that are out of stock; that is part of the day.
pub fn shopping_list(index: usize, stock: &[Item]) -> Vec<Item> {
    if stock.is_empty() {
        return Vec::new();
    }

    let wanted = 1 + index % 4;
    (0..wanted)
        .map(|n| {
            let pick = &stock[(index * 7 + n * 5) % stock.len()];
            pick.with_quantity(1 + ((index + n) % 3) as i64)
        })
        .collect()
}

fn entries() -> impl Iterator<Item = (&'static str, &'static str)> {
    AISLES
        .iter()
        .flat_map(|(_, items)| items.iter().copied())
}
