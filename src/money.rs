//! Whole-unit money amount.
//!
//! Amounts are unsigned integers in the minor currency unit. Accumulation is
//! checked so that a total which no longer fits is reported, never wrapped.

use std::fmt;
use std::str::FromStr;

/// An exact, non-negative monetary amount.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use iryouhi_converter::Amount;
///
/// let amount = Amount::from_str(" 1500 ").unwrap();
/// assert_eq!(amount.to_string(), "1500");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

/// Reason an amount field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountParseError {
    Empty,
    NotDigits,
    OutOfRange,
}

impl Amount {
    /// Zero value.
    pub const ZERO: Self = Amount(0);

    pub const fn new(value: u64) -> Self {
        Amount(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Adds `rhs`, returning `None` if the result would overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Accepts ASCII digits only; signs, separators and fractions are rejected.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::NotDigits);
        }
        trimmed
            .parse::<u64>()
            .map(Amount)
            .map_err(|_| AmountParseError::OutOfRange)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_trims_whitespace() {
        assert_eq!(Amount::from_str("  2500 ").unwrap(), Amount::new(2500));
        assert_eq!(Amount::from_str("0").unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_from_str_rejects_non_digits() {
        assert_eq!(Amount::from_str(""), Err(AmountParseError::Empty));
        assert_eq!(Amount::from_str("   "), Err(AmountParseError::Empty));
        assert_eq!(Amount::from_str("-5"), Err(AmountParseError::NotDigits));
        assert_eq!(Amount::from_str("+5"), Err(AmountParseError::NotDigits));
        assert_eq!(Amount::from_str("1,000"), Err(AmountParseError::NotDigits));
        assert_eq!(Amount::from_str("10.5"), Err(AmountParseError::NotDigits));
        assert_eq!(Amount::from_str("abc"), Err(AmountParseError::NotDigits));
    }

    #[test]
    fn test_from_str_rejects_out_of_range() {
        assert_eq!(
            Amount::from_str("18446744073709551616"),
            Err(AmountParseError::OutOfRange)
        );
        assert_eq!(
            Amount::from_str("18446744073709551615").unwrap(),
            Amount::new(u64::MAX)
        );
    }

    #[test]
    fn test_checked_add() {
        let a = Amount::new(1000);
        assert_eq!(a.checked_add(Amount::new(500)), Some(Amount::new(1500)));
        assert_eq!(Amount::new(u64::MAX).checked_add(Amount::new(1)), None);
    }
}
