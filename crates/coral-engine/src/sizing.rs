//! Quantity sizing against the exchange lot-size constraint.

use rust_decimal::Decimal;

/// Largest quantity purchasable with `budget` at `price`, floored to a
/// whole number of `min_qty` lot steps.
///
/// Returns zero when the budget does not cover one lot, or when either
/// `price` or `min_qty` is non-positive.
pub fn calculate_max_qty(price: Decimal, budget: Decimal, min_qty: Decimal) -> Decimal {
    if price <= Decimal::ZERO || min_qty <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (budget / price / min_qty).floor() * min_qty
}

/// Largest sellable quantity: the held balance floored to the lot step.
pub fn calculate_max_sell_qty(balance: Decimal, min_qty: Decimal) -> Decimal {
    if min_qty <= Decimal::ZERO || balance <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (balance / min_qty).floor() * min_qty
}
