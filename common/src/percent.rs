//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Percentage within `0..=100`.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Percent(Decimal);

impl Percent {
    /// `0%`.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// `100%`.
    pub const FULL: Self = Self(Decimal::ONE_HUNDRED);

    /// Computes the [`Percent`] of `part` in `whole`, rounded to two
    /// fractional digits.
    ///
    /// [`Percent::ZERO`] is returned if `whole` is zero, and the result is
    /// capped at [`Percent::FULL`].
    #[must_use]
    pub fn ratio(part: u64, whole: u64) -> Self {
        if whole == 0 {
            return Self::ZERO;
        }
        let val = (Decimal::from(part) * Decimal::ONE_HUNDRED
            / Decimal::from(whole))
        .round_dp(2)
        .normalize();
        Self(val.min(Decimal::ONE_HUNDRED))
    }

    /// Returns the value of this [`Percent`].
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Creates a new [`Percent`] by checking the provided value is within
    /// `0..=100`.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use super::Percent;

    #[test]
    fn ratio() {
        assert_eq!(Percent::ratio(1, 4).value(), dec!(25));
        assert_eq!(Percent::ratio(2, 3).value(), dec!(66.67));
        assert_eq!(Percent::ratio(3, 3), Percent::FULL);
        assert_eq!(Percent::ratio(0, 0), Percent::ZERO);
        assert_eq!(Percent::ratio(5, 0), Percent::ZERO);
    }

    #[test]
    fn from_str() {
        assert!("0".parse::<Percent>().is_ok());
        assert!("100".parse::<Percent>().is_ok());
        assert!("12.5".parse::<Percent>().is_ok());
        assert!("100.01".parse::<Percent>().is_err());
        assert!("-0.5".parse::<Percent>().is_err());
    }
}
