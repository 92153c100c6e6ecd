//! [`Area`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Floor area in square meters.
///
/// Always positive, with at most two fractional digits.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Area(Decimal);

impl Area {
    /// Maximum allowed [`Area`].
    pub const MAX: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

    /// Creates a new [`Area`] if the provided value is positive, doesn't
    /// exceed [`Area::MAX`] and has no more than two fractional digits.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        let val = val.normalize();
        (val > Decimal::ZERO && val <= Self::MAX && val.scale() <= 2)
            .then_some(Self(val))
    }

    /// Returns the value of this [`Area`].
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Area {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid area value")
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use super::Area;

    #[test]
    fn validates_bounds() {
        assert_eq!(Area::new(dec!(12.50)).map(|a| a.value()), Some(dec!(12.5)));
        assert!(Area::new(dec!(100000)).is_some());

        assert!(Area::new(dec!(0)).is_none());
        assert!(Area::new(dec!(-1)).is_none());
        assert!(Area::new(dec!(100000.01)).is_none());
        assert!(Area::new(dec!(1.005)).is_none());
    }

    #[test]
    fn from_str() {
        assert!("7.25".parse::<Area>().is_ok());
        assert!("seven".parse::<Area>().is_err());
        assert!("0".parse::<Area>().is_err());
    }
}
