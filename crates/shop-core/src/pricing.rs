//! # Price Calculator
//!
//! Pure unit-price computation: base price plus additive variant
//! adjustments from fixed lookup tables. Selector groups are applied in
//! order (size, then memory); adjustments are independent and summed.

use crate::cart::CartItem;
use crate::product::{Price, Product};

/// Storage-size adjustments in cents
const SIZE_ADJUSTMENTS: &[(&str, i64)] = &[
    ("128GB", 25_000),
    ("256GB", 50_000),
    ("32GB", -20_000),
];

/// Memory-size adjustments in cents
const RAM_ADJUSTMENTS: &[(&str, i64)] = &[("16GB", 20_000), ("4GB", -20_000)];

fn adjustment(table: &[(&str, i64)], selector: Option<&str>) -> i64 {
    match selector {
        Some(value) => table
            .iter()
            .find(|(key, _)| *key == value)
            .map(|(_, delta)| *delta)
            .unwrap_or(0),
        None => 0,
    }
}

/// Compute the unit price for a cart item against its matching product.
///
/// Unrecognized or absent selectors contribute no adjustment. Malformed
/// input yields a possibly-nonsensical but non-panicking amount; callers
/// validate selectors against a known set if stricter behavior is wanted.
pub fn unit_price(item: &CartItem, product: &Product) -> Price {
    let mut amount = product.price.amount;
    amount += adjustment(SIZE_ADJUSTMENTS, item.selected_size.as_deref());
    amount += adjustment(RAM_ADJUSTMENTS, item.selected_ram.as_deref());

    Price::from_cents(amount, product.price.currency)
}
