//! Prices
//!
//! Quantities are typed in thousandths of the list price's unit (grams for a
//! per-kilogram price), so a line total is `price * quantity / 1000`.

use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use tracing::warn;

use crate::carts::ProductCartWithData;

/// Divisor applied to the entered quantity.
pub const QUANTITY_SCALE: Decimal = Decimal::ONE_THOUSAND;

/// Parse a typed quantity, treating anything unparseable as zero.
pub fn parse_quantity(text: &str) -> Decimal {
    let text = text.trim();

    text.parse::<Decimal>()
        .or_else(|_err| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

/// Line total for a typed quantity.
///
/// The unit fraction is accepted but not applied: list prices are already
/// expressed per base unit. Negative quantities produce negative totals.
pub fn compute_line_total(unit_price: Decimal, _unit_fraction: Decimal, quantity: &str) -> Decimal {
    let quantity = parse_quantity(quantity);

    unit_price
        .checked_mul(quantity)
        .and_then(|value| value.checked_div(QUANTITY_SCALE))
        .unwrap_or_else(|| {
            warn!(%unit_price, %quantity, "line total overflowed, using zero");
            Decimal::ZERO
        })
}

/// Line total for a selected line at its current quantity.
pub fn line_total(line: &ProductCartWithData) -> Decimal {
    compute_line_total(
        line.product.product.price_list,
        line.product.unit.fraction,
        &line.line.quantity,
    )
}

/// Sum of line totals; zero when there are none.
///
/// A sum that overflows degrades to zero, like an overflowing line total.
pub fn sum_line_totals(lines: impl IntoIterator<Item = Decimal>) -> Decimal {
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .unwrap_or_else(|| {
            warn!("cart total overflowed, using zero");
            Decimal::ZERO
        })
}

/// Format an amount as Argentine pesos, rounded to two decimal places.
pub fn format_currency(value: Decimal) -> String {
    Money::from_decimal(value.round_dp(2), iso::ARS).to_string()
}
