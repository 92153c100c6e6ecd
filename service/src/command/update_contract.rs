//! [`Command`] for updating an existing [`Contract`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Clock, Date, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract::{self, InvalidPeriod, Period},
        tenant, unit, user, Contract, Tenant, Unit,
    },
    error::{Categorize, Kind},
    infra::{database, Database},
    read,
    Service,
};

use super::{Command, Overlap};

/// [`Command`] for updating an existing [`Contract`].
///
/// The [`Contract`] may be moved to another [`Unit`] or [`Tenant`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateContract {
    /// ID of the [`Contract`] to update.
    pub contract_id: contract::Id,

    /// ID of the user updating the [`Contract`].
    pub initiator_id: user::Id,

    /// ID of the rented [`Unit`].
    pub unit_id: unit::Id,

    /// ID of the [`Tenant`] renting the [`Unit`].
    pub tenant_id: tenant::Id,

    /// First day of the [`Contract`].
    pub start: Date,

    /// Last day of the [`Contract`], if it's not open-ended.
    pub end: Option<Date>,

    /// Monthly price of the [`Contract`].
    pub price: Money,

    /// Deposit of the [`Contract`], if any.
    pub deposit: Option<Money>,

    /// Indicator whether the deposit is paid.
    pub deposit_paid: bool,
}

impl<Db, Clk> Command<UpdateContract> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Unit, unit::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Tenant, tenant::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Contract>, read::contract::Overlapping>>,
            Ok = Vec<Contract>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateContract {
            contract_id,
            initiator_id,
            unit_id,
            tenant_id,
            start,
            end,
            price,
            deposit,
            deposit_paid,
        } = cmd;

        let period = Period::new(start, end)
            .map_err(E::InvalidRange)
            .map_err(tracerr::wrap!())?;

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let unit = self
            .database()
            .execute(Select(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of both the current and the target
        // `Unit`s, locking them in a stable order.
        let mut unit_ids = [contract.unit_id, unit.id];
        unit_ids.sort_unstable();
        for id in unit_ids {
            tx.execute(Lock(By::<Unit, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        // Keep the target `Tenant` from being deleted meanwhile.
        tx.execute(Lock(By::<Tenant, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let tenant = tx
            .execute(Select(By::<Option<Tenant>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())?;

        let mut contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if contract.is_cancelled() {
            return Err(tracerr::new!(E::ContractCancelled(contract_id)));
        }

        let conflicting = tx
            .execute(Select(By::<Vec<Contract>, _>::new(
                read::contract::Overlapping {
                    unit_id: unit.id,
                    period,
                    exclude: Some(contract.id),
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(overlap) = Overlap::detect(unit.id, &conflicting) {
            log::debug!("`UpdateContract` rejected: {overlap}");
            return Err(tracerr::new!(E::Overlap(overlap)));
        }

        contract.unit_id = unit.id;
        contract.tenant_id = tenant.id;
        contract.period = period;
        contract.price = price;
        contract.deposit = deposit;
        contract.deposit_paid = deposit_paid;
        contract.refresh_status(self.clock().today());
        contract.audit.touch(self.clock().now(), initiator_id);

        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(contract)
    }
}

/// Error of [`UpdateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is cancelled, so cannot be modified.
    #[display("`Contract(id: {_0})` is cancelled")]
    ContractCancelled(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested [`Period`] is malformed.
    #[display("Invalid `Contract` dates: {_0}")]
    InvalidRange(InvalidPeriod),

    /// Requested [`Period`] collides with other [`Contract`]s.
    #[display("{_0}")]
    Overlap(Overlap),

    /// [`Tenant`] with the provided ID does not exist.
    #[display("`Tenant(id: {_0})` does not exist")]
    TenantNotExists(#[error(not(source))] tenant::Id),

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::ContractCancelled(_) => Kind::AlreadyTerminal,
            Self::ContractNotExists(_)
            | Self::TenantNotExists(_)
            | Self::UnitNotExists(_) => Kind::NotFound,
            Self::Db(e) => e.kind(),
            Self::InvalidRange(_) => Kind::InvalidRange,
            Self::Overlap(_) => Kind::Overlap,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::Contract,
        error::{Categorize as _, Kind},
        fixture::{self, actor, book, date, money, seed, TestService},
        Command as _,
    };

    use super::{ExecutionError, UpdateContract};

    async fn reschedule(
        svc: &TestService,
        contract: &Contract,
        start: &str,
        end: Option<&str>,
    ) -> Result<Contract, tracerr::Traced<ExecutionError>> {
        svc.execute(UpdateContract {
            contract_id: contract.id,
            initiator_id: actor(),
            unit_id: contract.unit_id,
            tenant_id: contract.tenant_id,
            start: date(start),
            end: end.map(date),
            price: money("150"),
            deposit: contract.deposit,
            deposit_paid: contract.deposit_paid,
        })
        .await
    }

    #[tokio::test]
    async fn does_not_collide_with_itself() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c =
            book(&svc, unit.id, tenant.id, "2024-01-01", Some("2024-06-30"))
                .await
                .unwrap();

        let updated = reschedule(&svc, &c, "2024-02-01", Some("2024-07-31"))
            .await
            .unwrap();

        assert_eq!(updated.id, c.id);
        assert_eq!(updated.period.start(), date("2024-02-01"));
        assert_eq!(updated.price, money("150"));
    }

    #[tokio::test]
    async fn rejects_collision_with_others() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let first =
            book(&svc, unit.id, tenant.id, "2024-01-01", Some("2024-06-30"))
                .await
                .unwrap();
        let second = book(&svc, unit.id, tenant.id, "2024-07-01", None)
            .await
            .unwrap();

        let err = reschedule(&svc, &first, "2024-01-01", Some("2024-07-15"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Overlap);
        match err.as_ref() {
            ExecutionError::Overlap(o) => {
                assert_eq!(o.contract_ids, [second.id]);
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn moves_to_another_unit() {
        let (svc, _) = fixture::service("2024-03-01");
        let (premises, unit, tenant) = seed(&svc).await;
        let other = fixture::unit(&svc, premises.id, "B-1").await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();
        _ = book(&svc, other.id, tenant.id, "2024-05-01", None)
            .await
            .unwrap();

        let err = svc
            .execute(UpdateContract {
                contract_id: c.id,
                initiator_id: actor(),
                unit_id: other.id,
                tenant_id: tenant.id,
                start: date("2024-01-01"),
                end: None,
                price: c.price,
                deposit: None,
                deposit_paid: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Overlap);

        let moved = svc
            .execute(UpdateContract {
                contract_id: c.id,
                initiator_id: actor(),
                unit_id: other.id,
                tenant_id: tenant.id,
                start: date("2024-01-01"),
                end: Some(date("2024-04-30")),
                price: c.price,
                deposit: None,
                deposit_paid: false,
            })
            .await
            .unwrap();
        assert_eq!(moved.unit_id, other.id);
    }
}
