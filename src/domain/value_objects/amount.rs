//! Monetary amounts
//!
//! All money handled by the engine is a `rust_decimal::Decimal`. Values enter
//! from the JSON tree either as numbers or numeric strings. Whole amounts
//! leave it as JSON integers and fractional ones as decimal strings, so no
//! recomputed value ever passes through an `f64`.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Fractional digits of the currency minor unit (euro cents).
pub const MINOR_UNIT_DIGITS: u32 = 2;

/// Why a JSON value could not be read as an amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Not a number or numeric string (includes NaN/Infinity spellings)
    NotNumeric,
    /// More significant fractional digits than the minor unit allows
    ExcessPrecision { digits: u32 },
}

impl std::fmt::Display for AmountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountError::NotNumeric => write!(f, "not a finite number"),
            AmountError::ExcessPrecision { digits } => write!(
                f,
                "has {digits} fractional digits, at most {MINOR_UNIT_DIGITS} allowed"
            ),
        }
    }
}

/// Parse a decimal from text, accepting plain and scientific notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Read any JSON number or numeric string as a decimal.
///
/// Fractional JSON numbers are already `f64` once parsed; their shortest
/// round-trip text is exact up to 15 significant digits. Larger amounts
/// must arrive as strings to stay exact. `null`, booleans, containers and
/// non-numeric strings yield `None`.
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                // Shortest round-trip text of the f64, not its binary expansion.
                parse_decimal(&n.to_string())
            }
        }
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Read a monetary amount, rejecting anything finer than the minor unit.
///
/// Trailing zeros are harmless (`5000.000` is accepted); non-zero digits past
/// the cents are an error, never silently truncated.
pub fn amount_from_json(value: &Value) -> Result<Decimal, AmountError> {
    let parsed = decimal_from_json(value).ok_or(AmountError::NotNumeric)?;
    let normalized = parsed.normalize();
    if normalized.scale() > MINOR_UNIT_DIGITS {
        return Err(AmountError::ExcessPrecision {
            digits: normalized.scale(),
        });
    }
    Ok(with_scale(normalized, MINOR_UNIT_DIGITS))
}

/// Round half-up (away from zero on ties) to `digits` fractional digits and
/// pad to exactly that scale.
pub fn round_half_up(value: Decimal, digits: u32) -> Decimal {
    with_scale(
        value.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero),
        digits,
    )
}

/// Round to the currency minor unit.
pub fn round_money(value: Decimal) -> Decimal {
    round_half_up(value, MINOR_UNIT_DIGITS)
}

fn with_scale(mut value: Decimal, digits: u32) -> Decimal {
    if value.scale() < digits {
        value.rescale(digits);
    }
    value
}

/// Convert an amount back into a JSON value for the data tree.
///
/// Whole amounts become integers; anything with cents becomes its exact
/// decimal text (`"1234.50"`), which [`decimal_from_json`] reads back as is.
pub fn amount_to_json(value: Decimal) -> Value {
    if value.fract().is_zero() {
        if let Some(i) = value.trunc().to_i64() {
            return Value::from(i);
        }
    }
    Value::String(value.to_string())
}
