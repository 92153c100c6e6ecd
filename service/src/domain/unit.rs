//! [`Unit`] definitions.

use common::{define_kind, Area, Money};

use super::{define_id, define_text, impl_audited, premises, Audit};
#[cfg(doc)]
use super::{Contract, Premises};

/// Rentable storage unit housed in [`Premises`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Unit {
    /// ID of this [`Unit`].
    pub id: Id,

    /// ID of the [`Premises`] housing this [`Unit`].
    pub premises_id: premises::Id,

    /// [`Code`] of this [`Unit`], unique within its [`Premises`].
    pub code: Code,

    /// Monthly rent price of this [`Unit`].
    pub price: Money,

    /// Floor [`Area`] of this [`Unit`].
    pub area: Area,

    /// Operator-set [`State`] of this [`Unit`].
    ///
    /// Informational only: whether this [`Unit`] is rented is derived from
    /// its [`Contract`]s.
    pub state: State,

    /// [`Audit`] of this [`Unit`].
    pub audit: Audit<Unit>,
}

impl_audited!(Unit);

define_id! {
    /// ID of a [`Unit`].
    Id
}

define_text! {
    /// Identifier of a [`Unit`] within its [`Premises`] (like `A-12`).
    Code, max = 32
}

define_kind! {
    #[doc = "Nominal state of a [`Unit`] set by an operator."]
    enum State {
        #[doc = "[`Unit`] is free for rent."]
        Available = 1,

        #[doc = "[`Unit`] is rented."]
        Occupied = 2,

        #[doc = "[`Unit`] is under maintenance."]
        Maintenance = 3,

        #[doc = "[`Unit`] is reserved for a future rent."]
        Reserved = 4,
    }
}
