//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done in `Decimal`, then converted to `f64` (rounded
//! half-up to 2 places) for storage and serialization.

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::MAX_LINE_QUANTITY;

pub use crate::utils::validation::MAX_PRICE;

/// 2 decimal places, half-up
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal; non-finite input becomes zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a client-supplied amount to cents
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// `unit_price * quantity`
pub fn line_total(unit_price: f64, quantity: i32) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Sum of `(unit_price, quantity)` lines, rounded once at the end
pub fn order_total<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (f64, i32)>,
{
    let total: Decimal = lines
        .into_iter()
        .map(|(price, qty)| line_total(price, qty))
        .sum();
    to_f64(total)
}

/// Price must be finite, non-negative and at most [`MAX_PRICE`]
pub fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || !(0.0..=MAX_PRICE).contains(&price) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("price must be between 0 and {MAX_PRICE}, got {price}"),
        )
        .with_detail("field", "price"));
    }
    Ok(())
}

/// Line quantity must be in `1..=99`
pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(AppError::with_message(
            ErrorCode::OrderItemInvalidQuantity,
            format!("quantity must be between 1 and {MAX_LINE_QUANTITY}, got {quantity}"),
        )
        .with_detail("field", "quantity"));
    }
    Ok(())
}
