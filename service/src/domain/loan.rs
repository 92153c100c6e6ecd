//! [`Loan`] definitions.

use common::{define_kind, Date, Money, Percent};

use super::{define_id, define_text, impl_audited, premises, Audit};
#[cfg(doc)]
use super::{Expense, Premises};

/// Financing taken for [`Premises`], repaid with [`Expense`]s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Loan {
    /// ID of this [`Loan`].
    pub id: Id,

    /// ID of the financed [`Premises`].
    pub premises_id: premises::Id,

    /// Borrowed amount.
    pub principal: Money,

    /// Total amount to repay, never less than the [`Loan::principal`].
    pub total: Money,

    /// Annual interest rate, if known.
    pub rate: Option<Percent>,

    /// [`Date`] this [`Loan`] was granted on.
    pub granted_on: Date,

    /// [`Lender`] of this [`Loan`], if known.
    pub lender: Option<Lender>,

    /// [`Status`] of this [`Loan`].
    pub status: Status,

    /// [`Audit`] of this [`Loan`].
    pub audit: Audit<Loan>,
}

impl_audited!(Loan);

define_id! {
    /// ID of a [`Loan`].
    Id
}

define_text! {
    /// Name of a bank or a person who granted a [`Loan`].
    Lender, max = 255
}

define_kind! {
    #[doc = "Status of a [`Loan`]."]
    enum Status {
        #[doc = "[`Loan`] is being repaid."]
        Active = 1,

        #[doc = "[`Loan`] was cancelled."]
        Cancelled = 2,

        #[doc = "[`Loan`] is fully repaid."]
        Finished = 3,
    }
}
