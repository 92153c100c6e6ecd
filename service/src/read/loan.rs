//! [`Loan`] read model definitions.

use rust_decimal::Decimal;

use crate::domain::{Expense, Loan};

/// [`Loan`] along with its repayment progress.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    /// Summarized [`Loan`].
    pub loan: Loan,

    /// Amount repaid so far: sum of the [`Expense`]s repaying the [`Loan`].
    pub amortized: Decimal,

    /// Amount left to repay, never negative.
    pub outstanding: Decimal,
}

impl Summary {
    /// Summarizes the provided [`Loan`] out of the provided [`Expense`]s.
    ///
    /// [`Expense`]s not repaying the [`Loan`] are ignored.
    #[must_use]
    pub fn new(loan: Loan, expenses: &[Expense]) -> Self {
        let amortized = expenses
            .iter()
            .filter(|e| e.repays(loan.id))
            .map(|e| e.amount)
            .sum::<Decimal>();
        let outstanding = (loan.total.amount() - amortized).max(Decimal::ZERO);
        Self {
            loan,
            amortized,
            outstanding,
        }
    }

    /// Indicates whether the [`Loan`] is fully repaid.
    #[must_use]
    pub fn is_repaid(&self) -> bool {
        self.outstanding.is_zero()
    }
}
