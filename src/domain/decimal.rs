//! Lossless decimal numeric type backed by rust_decimal.
//!
//! All BRX and property-token amounts flow through this type so balance
//! arithmetic never drifts the way IEEE floats would.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal amount for balances, positions, and prices.
///
/// Serializes to a JSON number (not a string); persisted as a canonical
/// string without exponent notation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Format as a canonical string: trailing zeros trimmed, no exponent.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Clamp negative values to zero. Used for position decrements that
    /// must never drive a holding below zero.
    pub fn clamp_at_zero(self) -> Self {
        if self.is_negative() {
            Decimal::zero()
        } else {
            self
        }
    }

    /// Get the underlying rust_decimal value.
    pub fn inner(&self) -> RustDecimal {
        self.0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for s in ["123.456", "0.0001", "1000000", "-42.5", "0"] {
            let d = Decimal::from_str_canonical(s).expect("parse failed");
            let reparsed = Decimal::from_str_canonical(&d.to_canonical_string()).unwrap();
            assert_eq!(d, reparsed, "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn test_canonical_trims_trailing_zeros() {
        let d = Decimal::from_str_canonical("10.500").unwrap();
        assert_eq!(d.to_canonical_string(), "10.5");
    }

    #[test]
    fn test_clamp_at_zero() {
        let neg = Decimal::from_str_canonical("-3.2").unwrap();
        assert_eq!(neg.clamp_at_zero(), Decimal::zero());

        let pos = Decimal::from_str_canonical("3.2").unwrap();
        assert_eq!(pos.clamp_at_zero(), pos);
    }

    #[test]
    fn test_arithmetic() {
        let a = Decimal::from_str_canonical("60").unwrap();
        let price = Decimal::from_str_canonical("100").unwrap();
        assert_eq!((a / price).to_canonical_string(), "0.6");

        let t = Decimal::from_str_canonical("0.3").unwrap();
        assert_eq!((t * price).to_canonical_string(), "30");
    }

    #[test]
    fn test_json_number_serialization() {
        let d = Decimal::from_str_canonical("123.456").unwrap();
        let json = serde_json::to_value(d).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.456");
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Decimal::from_str_canonical("0.1").unwrap().is_positive());
        assert!(Decimal::from_str_canonical("-0.1").unwrap().is_negative());
        assert!(!Decimal::zero().is_positive());
        assert!(!Decimal::zero().is_negative());
    }
}
