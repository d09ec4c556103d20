use bigdecimal::{BigDecimal, Signed};
use num_bigint::{BigInt, Sign};
use std::str::FromStr;
use crate::models::outcome::ChainError;
use crate::models::types::Wei;

/// Decimal places between the display unit and the base unit (ether/wei).
pub const DECIMALS: i64 = 18;

/// Parses a display-unit decimal string such as `"0.0825"`.
pub fn parse_decimal(value: &str) -> Result<BigDecimal, ChainError> {
    let trimmed = value.trim();
    let invalid = || ChainError::InvalidAmount(value.to_string());

    // Exponents outside i32 would overflow the decimal's scale
    if let Some(at) = trimmed.find(|c| c == 'e' || c == 'E') {
        trimmed[at + 1..].parse::<i32>().map_err(|_| invalid())?;
    }
    BigDecimal::from_str(trimmed).map_err(|_| invalid())
}

/// Most decimal digits a base-unit amount can have (`U256::MAX` has 78).
const MAX_BASE_UNIT_DIGITS: i64 = 78;

/// Converts a display-unit amount into base units (`value * 10^18`).
///
/// Negative amounts and amounts with more than 18 fractional digits are
/// rejected rather than truncated. The exponent is checked before any
/// scaling, so work stays proportional to the digits actually written.
pub fn to_base_units(value: &BigDecimal) -> Result<Wei, ChainError> {
    if value.is_negative() {
        return Err(ChainError::InvalidAmount("amount must not be negative".to_string()));
    }

    let (digits, scale) = value.as_bigint_and_exponent();
    if digits.sign() == Sign::NoSign {
        return Ok(Wei::zero());
    }
    let width = digit_count(&digits);
    let shift = DECIMALS.saturating_sub(scale);

    if shift.saturating_add(width) > MAX_BASE_UNIT_DIGITS {
        return Err(ChainError::Overflow);
    }
    if shift <= -width {
        return Err(too_precise());
    }

    let whole = if shift >= 0 {
        digits * BigInt::from(10).pow(shift as u32)
    } else {
        let divisor = BigInt::from(10).pow(shift.unsigned_abs() as u32);
        if (&digits % &divisor).sign() != Sign::NoSign {
            return Err(too_precise());
        }
        digits / divisor
    };
    bigint_to_u256(&whole)
}

/// True when `value` is within the magnitude and precision window that
/// [`to_base_units`] can represent. Only the exponent and digit count are
/// inspected.
pub fn fits_base_units(value: &BigDecimal) -> bool {
    let (digits, scale) = value.as_bigint_and_exponent();
    if digits.sign() == Sign::NoSign {
        return true;
    }
    let width = digit_count(&digits);
    let shift = DECIMALS.saturating_sub(scale);
    shift.saturating_add(width) <= MAX_BASE_UNIT_DIGITS && shift > -width
}

fn digit_count(digits: &BigInt) -> i64 {
    digits.magnitude().to_str_radix(10).len() as i64
}

fn too_precise() -> ChainError {
    ChainError::InvalidAmount(format!("more than {} decimal places", DECIMALS))
}

/// Converts base units back into a normalized display-unit decimal.
pub fn from_base_units(value: Wei) -> BigDecimal {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    let digits = BigInt::from_bytes_le(Sign::Plus, &bytes);
    BigDecimal::new(digits, DECIMALS).normalized()
}

/// Display string for a base-unit amount, e.g. `100000000000000000` -> `"0.1"`.
pub fn format_base_units(value: Wei) -> String {
    let decimal = from_base_units(value);
    if decimal == BigDecimal::from(0) {
        return "0".to_string();
    }
    decimal.to_string()
}

fn bigint_to_u256(value: &BigInt) -> Result<Wei, ChainError> {
    let (sign, bytes) = value.to_bytes_le();
    if sign == Sign::Minus {
        return Err(ChainError::InvalidAmount("amount must not be negative".to_string()));
    }
    if bytes.len() > 32 {
        return Err(ChainError::Overflow);
    }
    let mut array = [0u8; 32];
    array[..bytes.len()].copy_from_slice(&bytes);
    Ok(Wei::from_little_endian(&array))
}
