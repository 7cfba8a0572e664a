//! Coercion of raw user-entered amounts into engine inputs.
//!
//! Bad input is never an error here: anything that is empty, unparseable or
//! negative becomes zero and is logged. Amounts above [`MAX_AMOUNT`] are
//! held to it.

use rust_decimal::Decimal;
use tracing::warn;

use crate::MAX_AMOUNT;

/// Trims whitespace and removes `,` and `_` digit separators.
pub fn normalize_amount_input(s: &str) -> String {
    s.trim().replace(',', "").replace('_', "")
}

/// Parses a user-entered amount.
///
/// `"1,50,000"` and `"150000"` both parse to 150,000. Empty input is zero
/// without a warning; non-numeric or negative input is zero with one.
pub fn parse_amount(s: &str) -> Decimal {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    match normalized.parse::<Decimal>() {
        Ok(value) if value.is_sign_negative() && !value.is_zero() => {
            warn!(input = %s, "negative amount coerced to zero");
            Decimal::ZERO
        }
        Ok(value) if value > MAX_AMOUNT => {
            warn!(input = %s, "amount above {} held to the ceiling", MAX_AMOUNT);
            MAX_AMOUNT
        }
        Ok(value) => value,
        Err(e) => {
            warn!(input = %s, "invalid amount coerced to zero: {}", e);
            Decimal::ZERO
        }
    }
}
