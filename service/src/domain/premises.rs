//! [`Premises`] definitions.

use super::{define_id, define_text, impl_audited, Audit};
#[cfg(doc)]
use super::{Expense, Loan, Unit};

/// Building housing [`Unit`]s, [`Expense`]s and [`Loan`]s are accounted to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Premises {
    /// ID of these [`Premises`].
    pub id: Id,

    /// [`Name`] of these [`Premises`].
    pub name: Name,

    /// [`Address`] of these [`Premises`], if known.
    pub address: Option<Address>,

    /// [`Audit`] of these [`Premises`].
    pub audit: Audit<Premises>,
}

impl_audited!(Premises);

define_id! {
    /// ID of [`Premises`].
    Id
}

define_text! {
    /// Name of [`Premises`].
    Name, max = 255
}

define_text! {
    /// Postal address of [`Premises`].
    Address, max = 512
}
