//! [`Money`]-related definitions.

use std::{fmt, iter::Sum, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Non-negative amount of money.
///
/// Has at most two fractional digits and never exceeds [`Money::MAX`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Money(Decimal);

impl Money {
    /// Zero [`Money`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Maximum allowed [`Money`] amount: `9 999 999 999.99`.
    pub const MAX: Decimal =
        Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

    /// Tolerance used by [`Money::approx_eq()`].
    pub const TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

    /// Creates a new [`Money`] if the provided amount is non-negative,
    /// doesn't exceed [`Money::MAX`] and has no more than two fractional
    /// digits.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        let amount = amount.normalize();
        (amount >= Decimal::ZERO && amount <= Self::MAX && amount.scale() <= 2)
            .then_some(Self(amount))
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Compares two [`Money`] amounts with a [`Money::TOLERANCE`].
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.0 - other.0).abs() <= Self::TOLERANCE
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("amount out of range")
    }
}

impl Sum<Money> for Decimal {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.map(|m| m.0).sum()
    }
}

impl<'a> Sum<&'a Money> for Decimal {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.map(|m| m.0).sum()
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::Money;

    #[test]
    fn max_is_ten_digits() {
        assert_eq!(Money::MAX, dec!(9999999999.99));
        assert_eq!(Money::TOLERANCE, dec!(0.005));
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("123.45").unwrap().amount(), dec!(123.45));
        assert_eq!(Money::from_str("123.00").unwrap().amount(), dec!(123));
        assert_eq!(Money::from_str("0").unwrap(), Money::ZERO);
        assert!(Money::from_str("9999999999.99").is_ok());

        assert!(Money::from_str("-1").is_err());
        assert!(Money::from_str("1.234").is_err());
        assert!(Money::from_str("10000000000").is_err());
        assert!(Money::from_str("12USD").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::from_str("123.4").unwrap().to_string(), "123.40");
        assert_eq!(Money::from_str("123").unwrap().to_string(), "123.00");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn approx_eq() {
        let a = Money::new(dec!(100.00)).unwrap();
        let b = Money::new(dec!(100.01)).unwrap();
        assert!(a.approx_eq(&a));
        assert!(!a.approx_eq(&b));
    }

    #[test]
    fn sums_into_decimal() {
        let total: Decimal = [dec!(1.10), dec!(2.20), dec!(3.30)]
            .into_iter()
            .filter_map(Money::new)
            .sum();
        assert_eq!(total, dec!(6.60));
    }
}
