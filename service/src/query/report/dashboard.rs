//! [`Dashboard`] definition.

use common::{
    operations::{By, Select},
    Clock, Date, Percent,
};
use serde::Serialize;
use tracerr::Traced;

use crate::{
    domain::{contract, premises, Contract, Premises, Unit},
    infra::{database, Database},
    query::finance::{Balance, MonthlyBalance},
    read::{self, unit::Occupancy},
    Query, Service,
};
#[cfg(doc)]
use crate::{domain::Tenant, Config};

/// [`Query`] for a snapshot of the whole business as of today.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Dashboard;

/// Output of the [`Dashboard`] [`Query`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Output {
    /// [`Date`] the snapshot is taken on.
    pub today: Date,

    /// [`Occupancy`] of all the [`Unit`]s.
    pub units: Occupancy,

    /// Share of rentable [`Unit`]s being occupied.
    pub occupancy_rate: Percent,

    /// [`Contract`] counters.
    pub contracts: ContractCounts,

    /// Number of [`Tenant`]s.
    pub tenants: u64,

    /// Number of [`Premises`].
    pub premises: u64,

    /// [`Balance`] of the current month.
    pub balance: Balance,
}

/// [`Contract`] counters of the [`Dashboard`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ContractCounts {
    /// Number of all the [`Contract`]s.
    pub total: u64,

    /// Number of [`Contract`]s active today.
    pub active: u64,

    /// Number of [`Contract`]s which haven't started yet.
    pub pending: u64,

    /// Number of active [`Contract`]s ending within
    /// [`Config::expiring_within_days`].
    pub expiring: u64,

    /// Number of active [`Contract`]s with unpaid deposit.
    pub pending_deposits: u64,
}

impl ContractCounts {
    /// Counts the provided [`Contract`]s as of the provided `today`.
    fn count(
        contracts: &[Contract],
        today: Date,
        expiring_within: u16,
    ) -> Self {
        let mut this = Self::default();
        for c in contracts {
            this.total += 1;
            if c.is_active_on(today) {
                this.active += 1;
                if c.has_unpaid_deposit() {
                    this.pending_deposits += 1;
                }
                if c.expires_within(today, expiring_within) {
                    this.expiring += 1;
                }
            } else if c.status_on(today) == contract::Status::Pending {
                this.pending += 1;
            }
        }
        this
    }
}

impl<Db, Clk> Query<Dashboard> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Vec<Unit>, Option<premises::Id>>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Contract>, Option<premises::Id>>>,
            Ok = Vec<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::tenant::TotalCount, ()>>,
            Ok = read::tenant::TotalCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Premises>, ()>>,
            Ok = Vec<Premises>,
            Err = Traced<database::Error>,
        >,
    Self: Query<MonthlyBalance, Ok = Balance, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Dashboard) -> Result<Self::Ok, Self::Err> {
        let today = self.clock().today();

        let units = self
            .database()
            .execute(Select(By::<Vec<Unit>, _>::new(None)))
            .await
            .map_err(tracerr::wrap!())?;
        let contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(None)))
            .await
            .map_err(tracerr::wrap!())?;
        let tenants = self
            .database()
            .execute(Select(By::<read::tenant::TotalCount, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        let premises = self
            .database()
            .execute(Select(By::<Vec<Premises>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        let balance = self
            .execute(MonthlyBalance(today.year_month()))
            .await
            .map_err(tracerr::wrap!())?;

        let units = Occupancy::compute(&units, &contracts, today);
        Ok(Output {
            today,
            units,
            occupancy_rate: units.rate(),
            contracts: ContractCounts::count(
                &contracts,
                today,
                self.config().expiring_within_days,
            ),
            tenants: tenants.into(),
            premises: u64::try_from(premises.len()).unwrap_or(u64::MAX),
            balance,
        })
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use crate::{
        fixture::{self, book, seed},
        Command as _,
    };

    use super::Dashboard;

    #[tokio::test]
    async fn empty() {
        let (svc, _) = fixture::service("2024-03-01");

        let out = svc.execute(Dashboard).await.unwrap();
        assert_eq!(out.units.total, 0);
        assert_eq!(out.occupancy_rate.value(), dec!(0));
        assert_eq!(out.contracts.total, 0);
        assert_eq!(out.tenants, 0);
        assert_eq!(out.premises, 0);
        assert_eq!(out.balance.totals.net, dec!(0));
    }

    #[tokio::test]
    async fn summarizes_today() {
        let (svc, _) = fixture::service("2024-03-20");
        let (premises, unit, tenant) = seed(&svc).await;
        let other = fixture::unit(&svc, premises.id, "A-2").await;
        _ = fixture::tenant(&svc, "Jane Roe").await;
        let c =
            book(&svc, unit.id, tenant.id, "2024-01-01", Some("2024-04-10"))
                .await
                .unwrap();
        _ = book(&svc, other.id, tenant.id, "2024-05-01", None)
            .await
            .unwrap();
        _ = fixture::income(&svc, c.id, "300", "2024-03-01").await;
        _ = fixture::income(&svc, c.id, "300", "2024-02-01").await;
        _ = fixture::expense(&svc, premises.id, None, "120", "2024-03-15")
            .await;

        let out = svc.execute(Dashboard).await.unwrap();
        assert_eq!(out.today, fixture::date("2024-03-20"));
        assert_eq!(out.units.total, 2);
        assert_eq!(out.units.occupied, 1);
        assert_eq!(out.units.reserved, 1);
        assert_eq!(out.occupancy_rate.value(), dec!(50));
        assert_eq!(out.contracts.total, 2);
        assert_eq!(out.contracts.active, 1);
        assert_eq!(out.contracts.pending, 1);
        assert_eq!(out.contracts.expiring, 1);
        assert_eq!(out.contracts.pending_deposits, 0);
        assert_eq!(out.tenants, 2);
        assert_eq!(out.premises, 1);
        assert_eq!(out.balance.totals.income, dec!(300));
        assert_eq!(out.balance.totals.net, dec!(180));
    }
}
