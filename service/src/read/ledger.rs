//! [`Income`] and [`Expense`] read model definitions.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Expense, Income};

/// Totals of [`Income`]s and [`Expense`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Totals {
    /// Sum of [`Income`]s.
    pub income: Decimal,

    /// Sum of [`Expense`]s.
    pub expense: Decimal,

    /// Difference between [`Totals::income`] and [`Totals::expense`].
    pub net: Decimal,
}

impl Totals {
    /// Sums up the provided [`Income`]s and [`Expense`]s.
    #[must_use]
    pub fn new<'a, I, E>(incomes: I, expenses: E) -> Self
    where
        I: IntoIterator<Item = &'a Income>,
        E: IntoIterator<Item = &'a Expense>,
    {
        let income = incomes.into_iter().map(|i| i.amount).sum::<Decimal>();
        let expense = expenses.into_iter().map(|e| e.amount).sum::<Decimal>();
        Self {
            income,
            expense,
            net: income - expense,
        }
    }

    /// Returns the share of [`Totals::net`] in [`Totals::income`] in percents,
    /// rounded to two fractional digits.
    ///
    /// [`None`] if there is no income.
    #[must_use]
    pub fn margin(&self) -> Option<Decimal> {
        (!self.income.is_zero()).then(|| {
            (self.net * Decimal::ONE_HUNDRED / self.income).round_dp(2)
        })
    }
}

impl std::ops::Add for Totals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            income: self.income + rhs.income,
            expense: self.expense + rhs.expense,
            net: self.net + rhs.net,
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use super::Totals;

    #[test]
    fn computes_margin() {
        let totals = Totals {
            income: dec!(200),
            expense: dec!(50),
            net: dec!(150),
        };
        assert_eq!(totals.margin(), Some(dec!(75)));

        let loss = Totals {
            income: dec!(300),
            expense: dec!(400),
            net: dec!(-100),
        };
        assert_eq!(loss.margin(), Some(dec!(-33.33)));
    }

    #[test]
    fn has_no_margin_without_income() {
        let totals = Totals {
            income: dec!(0),
            expense: dec!(10),
            net: dec!(-10),
        };
        assert_eq!(totals.margin(), None);
    }

    #[test]
    fn adds_up() {
        let a = Totals {
            income: dec!(10),
            expense: dec!(3),
            net: dec!(7),
        };
        let b = Totals {
            income: dec!(1.5),
            expense: dec!(4),
            net: dec!(-2.5),
        };
        assert_eq!(
            a + b,
            Totals {
                income: dec!(11.5),
                expense: dec!(7),
                net: dec!(4.5),
            },
        );
    }
}
