//! [`Query`] collection related to [`Contract`]s.

use common::{
    operations::{By, Select},
    Clock, Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, InvalidPeriod, Period},
        tenant, unit, Contract,
    },
    error::{Categorize, Kind},
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::{Tenant, Unit};

use super::{DatabaseQuery, Query};

/// Queries a [`Contract`] by its [`contract::Id`].
pub type ById = DatabaseQuery<By<Option<Contract>, contract::Id>>;

/// [`Query`] for non-cancelled [`Contract`]s of a [`Unit`] colliding with the
/// provided dates, ordered by their start.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FindOverlapping {
    /// ID of the [`Unit`] to check.
    pub unit_id: unit::Id,

    /// First day to check.
    pub start: Date,

    /// Last day to check, if bounded.
    pub end: Option<Date>,

    /// ID of the [`Contract`] to ignore, if any.
    pub exclude: Option<contract::Id>,
}

impl<Db, Clk> Query<FindOverlapping> for Service<Db, Clk>
where
    Db: Database<
        Select<By<Vec<Contract>, read::contract::Overlapping>>,
        Ok = Vec<Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Contract>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: FindOverlapping,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let FindOverlapping {
            unit_id,
            start,
            end,
            exclude,
        } = query;

        let period = Period::new(start, end)
            .map_err(E::InvalidRange)
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Select(By::<Vec<Contract>, _>::new(
                read::contract::Overlapping {
                    unit_id,
                    period,
                    exclude,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`FindOverlapping`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested dates are malformed.
    #[display("Invalid dates: {_0}")]
    InvalidRange(InvalidPeriod),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::InvalidRange(_) => Kind::InvalidRange,
        }
    }
}

/// [`Query`] for [`Contract`]s of a [`Unit`] active today.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActiveForUnit(pub unit::Id);

impl<Db, Clk> Query<ActiveForUnit> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
        Select<By<Vec<Contract>, unit::Id>>,
        Ok = Vec<Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ActiveForUnit(unit_id): ActiveForUnit,
    ) -> Result<Self::Ok, Self::Err> {
        let today = self.clock().today();
        let mut contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(unit_id)))
            .await
            .map_err(tracerr::wrap!())?;
        contracts.retain(|c| c.is_active_on(today));
        Ok(contracts)
    }
}

/// [`Query`] for [`Contract`]s of a [`Tenant`] active today.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActiveForTenant(pub tenant::Id);

impl<Db, Clk> Query<ActiveForTenant> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
        Select<By<Vec<Contract>, tenant::Id>>,
        Ok = Vec<Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ActiveForTenant(tenant_id): ActiveForTenant,
    ) -> Result<Self::Ok, Self::Err> {
        let today = self.clock().today();
        let mut contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::wrap!())?;
        contracts.retain(|c| c.is_active_on(today));
        Ok(contracts)
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{CancelContract, DeleteContract},
        domain::Contract,
        fixture::{self, actor, book, seed},
        Command as _, Query as _,
    };

    use super::{ActiveForTenant, ActiveForUnit};

    #[tokio::test]
    async fn lists_only_active_contracts() {
        let (svc, _) = fixture::service("2024-03-15");
        let (premises, unit, tenant) = seed(&svc).await;

        let cancelled =
            book(&svc, unit.id, tenant.id, "2024-03-01", Some("2024-03-31"))
                .await
                .unwrap();
        _ = svc
            .execute(CancelContract {
                contract_id: cancelled.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        let deleted =
            book(&svc, unit.id, tenant.id, "2024-03-01", Some("2024-03-31"))
                .await
                .unwrap();
        _ = svc
            .execute(DeleteContract {
                contract_id: deleted.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        _ = book(&svc, unit.id, tenant.id, "2024-01-01", Some("2024-01-31"))
            .await
            .unwrap();
        let active =
            book(&svc, unit.id, tenant.id, "2024-02-01", Some("2024-04-30"))
                .await
                .unwrap();
        _ = book(&svc, unit.id, tenant.id, "2024-05-01", None)
            .await
            .unwrap();

        let other_unit = fixture::unit(&svc, premises.id, "B-2").await;
        let other_tenant = fixture::tenant(&svc, "Jane Roe").await;
        _ = book(&svc, other_unit.id, other_tenant.id, "2024-03-01", None)
            .await
            .unwrap();

        let ids = |cs: Vec<Contract>| {
            cs.into_iter().map(|c| c.id).collect::<Vec<_>>()
        };
        let by_unit = svc.execute(ActiveForUnit(unit.id)).await.unwrap();
        assert_eq!(ids(by_unit), [active.id]);
        let by_tenant =
            svc.execute(ActiveForTenant(tenant.id)).await.unwrap();
        assert_eq!(ids(by_tenant), [active.id]);
    }

    #[tokio::test]
    async fn follows_the_clock() {
        let (svc, clock) = fixture::service("2024-03-15");
        let (_, unit, tenant) = seed(&svc).await;
        let c =
            book(&svc, unit.id, tenant.id, "2024-04-01", Some("2024-04-30"))
                .await
                .unwrap();

        let found = svc.execute(ActiveForUnit(unit.id)).await.unwrap();
        assert!(found.is_empty());

        clock.set(fixture::date("2024-04-30"));
        let found = svc.execute(ActiveForTenant(tenant.id)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, c.id);

        clock.set(fixture::date("2024-05-01"));
        let found = svc.execute(ActiveForUnit(unit.id)).await.unwrap();
        assert!(found.is_empty());
    }
}
