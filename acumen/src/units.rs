//! Exact conversion between raw on-chain integers and decimal amounts.
//!
//! Token contracts represent fractional amounts as integers scaled by
//! `10^decimals`. Both directions here are pure integer/string arithmetic -
//! there is no floating-point intermediate, so a raw balance of `1500000`
//! with 6 decimals is exactly `1.5` and a withdrawal of `"10.50"` is exactly
//! `10500000` base units, at any number of decimals.

use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;

/// Errors from unit conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    /// The amount string is not a plain non-negative decimal number.
    #[error("invalid decimal amount {0:?}")]
    InvalidAmount(String),

    /// The amount has more fractional digits than the token's decimals.
    #[error("amount {amount:?} exceeds the token's {decimals} decimals")]
    ExcessPrecision {
        /// The offending amount string.
        amount: String,
        /// The token's decimals.
        decimals: u8,
    },

    /// The value does not fit the target representation.
    #[error("value out of range for {0} decimals")]
    OutOfRange(u8),
}

/// Converts a raw integer amount into its exact decimal value.
///
/// # Errors
///
/// Returns [`UnitsError::OutOfRange`] when the result cannot be represented
/// as a [`Decimal`] (more than 28 significant digits of scale, or an integer
/// part beyond `Decimal`'s 96-bit range). Callers treating balances as
/// best-effort degrade such a value to zero.
pub fn format_units(raw: U256, decimals: u8) -> Result<Decimal, UnitsError> {
    let digits = raw.to_string();
    let width = usize::from(decimals);
    let text = if width == 0 {
        digits
    } else if digits.len() > width {
        let (int_part, frac_part) = digits.split_at(digits.len() - width);
        format!("{int_part}.{frac_part}")
    } else {
        format!("0.{digits:0>width$}")
    };
    Decimal::from_str(&text).map_err(|_| UnitsError::OutOfRange(decimals))
}

/// Converts a decimal amount string into the raw integer base-unit amount.
///
/// Accepts plain non-negative decimal notation (`"10"`, `"10.50"`, `".5"`).
/// Trailing fractional zeros are insignificant: `"1.500000"` with 6 decimals
/// is the same 1500000 base units as `"1.5"`.
///
/// # Errors
///
/// - [`UnitsError::InvalidAmount`] for empty, signed, or non-numeric input
/// - [`UnitsError::ExcessPrecision`] when significant fractional digits
///   exceed `decimals`
/// - [`UnitsError::OutOfRange`] when the result overflows `U256`
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let trimmed = amount.trim();
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };
    let all_digits =
        |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let int_ok = int_part.is_empty() || all_digits(int_part);
    let frac_ok = frac_part.is_empty() || all_digits(frac_part);
    if !int_ok || !frac_ok || (int_part.is_empty() && frac_part.is_empty()) {
        return Err(UnitsError::InvalidAmount(amount.to_owned()));
    }

    let significant_frac = frac_part.trim_end_matches('0');
    if significant_frac.len() > usize::from(decimals) {
        return Err(UnitsError::ExcessPrecision {
            amount: amount.to_owned(),
            decimals,
        });
    }

    let mut base_units = String::with_capacity(int_part.len() + usize::from(decimals));
    base_units.push_str(if int_part.is_empty() { "0" } else { int_part });
    base_units.push_str(significant_frac);
    base_units.extend(std::iter::repeat_n('0', usize::from(decimals) - significant_frac.len()));

    U256::from_str_radix(&base_units, 10).map_err(|_| UnitsError::OutOfRange(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_exact_at_six_decimals() {
        let amount = format_units(U256::from(1_500_000_u64), 6).unwrap();
        assert_eq!(amount, Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn format_is_exact_at_eighteen_decimals() {
        // 27 significant digits survive without rounding.
        let raw = U256::from_str("123456789123456789012345678").unwrap();
        let amount = format_units(raw, 18).unwrap();
        assert_eq!(amount, Decimal::from_str("123456789.123456789012345678").unwrap());
    }

    #[test]
    fn format_pads_small_values() {
        let amount = format_units(U256::from(1_u64), 18).unwrap();
        assert_eq!(amount, Decimal::from_str("0.000000000000000001").unwrap());
    }

    #[test]
    fn format_zero() {
        assert_eq!(format_units(U256::ZERO, 6).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn format_zero_decimals() {
        assert_eq!(format_units(U256::from(42_u64), 0).unwrap(), Decimal::from(42));
    }

    #[test]
    fn parse_exact_base_units() {
        assert_eq!(parse_units("10.50", 6).unwrap(), U256::from(10_500_000_u64));
        assert_eq!(parse_units("10", 6).unwrap(), U256::from(10_000_000_u64));
        assert_eq!(parse_units(".5", 6).unwrap(), U256::from(500_000_u64));
        assert_eq!(parse_units("0", 6).unwrap(), U256::ZERO);
    }

    #[test]
    fn parse_ignores_trailing_fractional_zeros() {
        assert_eq!(parse_units("1.500000", 6).unwrap(), U256::from(1_500_000_u64));
        assert_eq!(parse_units("1.5000000000", 6).unwrap(), U256::from(1_500_000_u64));
    }

    #[test]
    fn parse_rejects_excess_precision() {
        assert!(matches!(
            parse_units("0.0000001", 6),
            Err(UnitsError::ExcessPrecision { decimals: 6, .. })
        ));
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", ".", "-1", "1.2.3", "1e6", "ten", "0x10"] {
            assert!(matches!(parse_units(bad, 6), Err(UnitsError::InvalidAmount(_))), "{bad:?}");
        }
    }

    #[test]
    fn roundtrip_at_high_decimals() {
        let raw = parse_units("0.000000000000000001", 18).unwrap();
        assert_eq!(raw, U256::from(1_u64));
        let back = format_units(raw, 18).unwrap();
        assert_eq!(back, Decimal::from_str("0.000000000000000001").unwrap());
    }
}
