//! [`Expense`] definitions.

use common::{define_kind, Date, Money};

use super::{
    define_id, impl_audited,
    ledger::{Description, Method},
    loan, premises, Audit,
};
#[cfg(doc)]
use super::{Loan, Premises};

/// Money spent on [`Premises`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expense {
    /// ID of this [`Expense`].
    pub id: Id,

    /// ID of the [`Premises`] this [`Expense`] is accounted to.
    pub premises_id: premises::Id,

    /// ID of the [`Loan`] this [`Expense`] repays, if any.
    pub loan_id: Option<loan::Id>,

    /// Spent amount.
    pub amount: Money,

    /// [`Date`] this [`Expense`] was made on.
    pub spent_on: Date,

    /// [`Category`] of this [`Expense`].
    pub category: Category,

    /// Payment [`Method`], if known.
    pub method: Option<Method>,

    /// [`Description`] of this [`Expense`], if any.
    pub description: Option<Description>,

    /// [`Audit`] of this [`Expense`].
    pub audit: Audit<Expense>,
}

impl_audited!(Expense);

impl Expense {
    /// Indicates whether this [`Expense`] repays the provided [`Loan`].
    #[must_use]
    pub fn repays(&self, loan_id: loan::Id) -> bool {
        self.category == Category::LoanPayment && self.loan_id == Some(loan_id)
    }
}

define_id! {
    /// ID of an [`Expense`].
    Id
}

define_kind! {
    #[doc = "Category of an [`Expense`]."]
    enum Category {
        #[doc = "Repairs and upkeep."]
        Maintenance = 1,

        #[doc = "Water, power, internet, etc."]
        Utilities = 2,

        #[doc = "Taxes and duties."]
        Taxes = 3,

        #[doc = "Insurance premiums."]
        Insurance = 4,

        #[doc = "[`Loan`] repayment."]
        LoanPayment = 5,

        #[doc = "Anything else."]
        Other = 6,
    }
}
