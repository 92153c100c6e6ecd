//! Serializable views of domain entities.

use common::{Date, Money};
use serde::Serialize;
use service::domain::{contract, tenant, unit, Contract};

/// [`Contract`] as printed to the operator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ContractView {
    /// ID of the [`Contract`].
    pub id: contract::Id,

    /// ID of the rented unit.
    pub unit_id: unit::Id,

    /// ID of the tenant.
    pub tenant_id: tenant::Id,

    /// First day of the [`Contract`].
    pub start: Date,

    /// Last day of the [`Contract`], if bounded.
    pub end: Option<Date>,

    /// Monthly price.
    pub price: Money,

    /// Status of the [`Contract`] on the day of the view.
    pub status: String,
}

impl ContractView {
    /// Renders the provided [`Contract`] as of the provided `today`.
    #[must_use]
    pub fn new(contract: &Contract, today: Date) -> Self {
        Self {
            id: contract.id,
            unit_id: contract.unit_id,
            tenant_id: contract.tenant_id,
            start: contract.period.start(),
            end: contract.period.end(),
            price: contract.price,
            status: contract.status_on(today).to_string(),
        }
    }
}
