//! Token amounts using fixed-point decimal
//!
//! Payment link amounts are requested in whole or fractional token units
//! (e.g. `0.5` sBTC), so the value is held as a `Decimal` rather than `f64`.
//!
//! # Wire format
//!
//! - Serializes as a JSON number, matching what the web client sends and reads
//! - Falls back to a decimal string when an `f64` cannot hold the exact value,
//!   so stored records read back unchanged
//! - Deserializes from a JSON number or a numeric string
//! - Numbers go through their shortest decimal rendering, so `0.1` stays `0.1`

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Token amount with fixed-point precision
///
/// # Examples
///
/// ```rust
/// use stackfund_lib::Amount;
///
/// let a = Amount::from_str_checked("0.5").unwrap();
/// assert!(a.is_positive());
/// assert_eq!(a.to_string(), "0.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    /// Wrap a decimal value.
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Create from decimal string (e.g., "123.45")
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed as a valid decimal.
    pub fn from_str_checked(s: &str) -> Result<Self, String> {
        Decimal::from_str(s.trim())
            .map(|value| Self { value })
            .map_err(|e| format!("Invalid amount: {}", e))
    }

    /// Create from a float via its shortest decimal rendering.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Self::from_str_checked(&value.to_string()).ok()
    }

    /// Get zero amount
    pub fn zero() -> Self {
        Self {
            value: Decimal::ZERO,
        }
    }

    /// Check if amount is strictly greater than zero
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackfund_lib::Amount;
    /// assert!(!Amount::zero().is_positive());
    /// assert!(!Amount::from_str_checked("-1").unwrap().is_positive());
    /// ```
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Get the internal Decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.normalize())
    }
}

impl FromStr for Amount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_checked(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value.to_f64() {
            Some(v) if Amount::from_f64(v) == Some(*self) => serializer.serialize_f64(v),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Amount::from_f64(v).ok_or_else(|| E::custom(format!("amount out of range: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str_checked(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_creation() {
        let amt = Amount::from_str_checked("0.5").unwrap();
        assert_eq!(amt.as_decimal(), dec!(0.5));
        assert_eq!(Amount::from_f64(0.5), Some(amt));
        assert!(Amount::from_str_checked("abc").is_err());
        assert!(Amount::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_positive() {
        assert!(Amount::from_str_checked("0.00000001").unwrap().is_positive());
        assert!(!Amount::from_str_checked("0").unwrap().is_positive());
        assert!(!Amount::from_str_checked("-0.5").unwrap().is_positive());
    }

    #[test]
    fn test_serializes_as_number() {
        let amt = Amount::from_str_checked("0.5").unwrap();
        assert_eq!(serde_json::to_string(&amt).unwrap(), "0.5");
    }

    #[test]
    fn test_high_precision_serializes_as_string() {
        let amt = Amount::from_str_checked("1.00000000000000000001").unwrap();
        let json = serde_json::to_string(&amt).unwrap();
        assert_eq!(json, "\"1.00000000000000000001\"");

        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amt);
        assert_eq!(back.as_decimal(), dec!(1.00000000000000000001));
    }

    #[test]
    fn test_trailing_zeros_still_serialize_as_number() {
        let amt = Amount::from_str_checked("2.500").unwrap();
        assert_eq!(serde_json::to_string(&amt).unwrap(), "2.5");
        assert_eq!(serde_json::to_string(&Amount::zero()).unwrap(), "0.0");
    }

    #[test]
    fn test_deserializes_number_or_string() {
        let a: Amount = serde_json::from_str("0.1").unwrap();
        let b: Amount = serde_json::from_str("\"0.1\"").unwrap();
        let c: Amount = serde_json::from_str("3").unwrap();
        assert_eq!(a.as_decimal(), dec!(0.1));
        assert_eq!(a, b);
        assert_eq!(c.as_decimal(), dec!(3));
        assert!(serde_json::from_str::<Amount>("true").is_err());
    }

    #[test]
    fn test_display_drops_trailing_zeros() {
        let amt = Amount::from_str_checked("2.500").unwrap();
        assert_eq!(amt.to_string(), "2.5");
    }
}
