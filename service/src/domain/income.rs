//! [`Income`] definitions.

use common::{define_kind, Date, Money};

use super::{
    contract, define_id, impl_audited,
    ledger::{Description, Method},
    Audit,
};
#[cfg(doc)]
use super::Contract;

/// Money received under a [`Contract`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Income {
    /// ID of this [`Income`].
    pub id: Id,

    /// ID of the [`Contract`] this [`Income`] is received under.
    pub contract_id: contract::Id,

    /// Received amount.
    pub amount: Money,

    /// [`Date`] this [`Income`] was paid on.
    pub paid_on: Date,

    /// [`Category`] of this [`Income`].
    pub category: Category,

    /// Payment [`Method`], if known.
    pub method: Option<Method>,

    /// [`Description`] of this [`Income`], if any.
    pub description: Option<Description>,

    /// [`Audit`] of this [`Income`].
    pub audit: Audit<Income>,
}

impl_audited!(Income);

define_id! {
    /// ID of an [`Income`].
    Id
}

define_kind! {
    #[doc = "Category of an [`Income`]."]
    enum Category {
        #[doc = "Monthly rent."]
        Rent = 1,

        #[doc = "Deposit payment."]
        Deposit = 2,

        #[doc = "Anything else."]
        Other = 3,
    }
}
