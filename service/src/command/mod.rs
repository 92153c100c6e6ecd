//! [`Command`] definition.

pub mod cancel_contract;
pub mod create_contract;
pub mod create_loan;
pub mod create_premises;
pub mod create_tenant;
pub mod create_unit;
pub mod delete_contract;
pub mod delete_expense;
pub mod delete_income;
pub mod delete_tenant;
pub mod finalize_contract;
pub mod mark_deposit_paid;
pub mod record_expense;
pub mod record_income;
pub mod renew_contract;
pub mod restore_contract;
pub mod restore_tenant;
pub mod set_unit_state;
pub mod update_contract;

use std::fmt;

use derive_more::Error;

use crate::domain::{contract, unit, Contract};
#[cfg(doc)]
use crate::domain::{contract::Period, Unit};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_contract::CancelContract, create_contract::CreateContract,
    create_loan::CreateLoan, create_premises::CreatePremises,
    create_tenant::CreateTenant, create_unit::CreateUnit,
    delete_contract::DeleteContract, delete_expense::DeleteExpense,
    delete_income::DeleteIncome, delete_tenant::DeleteTenant,
    finalize_contract::FinalizeContract,
    mark_deposit_paid::MarkDepositPaid, record_expense::RecordExpense,
    record_income::RecordIncome, renew_contract::RenewContract,
    restore_contract::RestoreContract, restore_tenant::RestoreTenant,
    set_unit_state::SetUnitState, update_contract::UpdateContract,
};

/// Rejection of a [`Contract`] [`Period`] colliding with other [`Contract`]s
/// of the same [`Unit`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Overlap {
    /// ID of the [`Unit`] the [`Contract`]s collide on.
    #[error(not(source))]
    pub unit_id: unit::Id,

    /// IDs of the colliding [`Contract`]s, ordered by their start.
    #[error(not(source))]
    pub contract_ids: Vec<contract::Id>,
}

impl Overlap {
    /// Creates a new [`Overlap`] out of the provided colliding [`Contract`]s,
    /// if there are any.
    #[must_use]
    pub fn detect(unit_id: unit::Id, conflicting: &[Contract]) -> Option<Self> {
        (!conflicting.is_empty()).then(|| Self {
            unit_id,
            contract_ids: conflicting.iter().map(|c| c.id).collect(),
        })
    }
}

impl fmt::Display for Overlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`Unit(id: {})` is already rented by `Contract`s: ",
            self.unit_id,
        )?;
        for (n, id) in self.contract_ids.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}
