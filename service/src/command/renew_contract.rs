//! [`Command`] for renewing a [`Contract`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Clock, Date, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract::{self, InvalidPeriod},
        unit, user, Contract, Unit,
    },
    error::{Categorize, Kind},
    infra::{database, Database},
    read,
    Service,
};

use super::{Command, Overlap};

/// [`Command`] for renewing a [`Contract`]: replacing its end, optionally
/// with a new price.
#[derive(Clone, Copy, Debug)]
pub struct RenewContract {
    /// ID of the [`Contract`] to renew.
    pub contract_id: contract::Id,

    /// ID of the user renewing the [`Contract`].
    pub initiator_id: user::Id,

    /// New last day of the [`Contract`], or [`None`] to make it open-ended.
    pub end: Option<Date>,

    /// New monthly price of the [`Contract`], if it changes.
    pub price: Option<Money>,
}

impl<Db, Clk> Command<RenewContract> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Unit, unit::Id>>,
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
        cmd: RenewContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RenewContract {
            contract_id,
            initiator_id,
            end,
            price,
        } = cmd;

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `Unit`.
        tx.execute(Lock(By::<Unit, _>::new(contract.unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if contract.is_cancelled() {
            return Err(tracerr::new!(E::ContractCancelled(contract_id)));
        }

        let period = contract
            .period
            .with_end(end)
            .map_err(E::InvalidRange)
            .map_err(tracerr::wrap!())?;

        let conflicting = tx
            .execute(Select(By::<Vec<Contract>, _>::new(
                read::contract::Overlapping {
                    unit_id: contract.unit_id,
                    period,
                    exclude: Some(contract.id),
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(overlap) = Overlap::detect(contract.unit_id, &conflicting) {
            log::debug!("`RenewContract` rejected: {overlap}");
            return Err(tracerr::new!(E::Overlap(overlap)));
        }

        contract.period = period;
        if let Some(price) = price {
            contract.price = price;
        }
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

/// Error of [`RenewContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is cancelled, so cannot be renewed.
    #[display("`Contract(id: {_0})` is cancelled")]
    ContractCancelled(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested end precedes the start of the [`Contract`].
    #[display("Invalid `Contract` dates: {_0}")]
    InvalidRange(InvalidPeriod),

    /// Renewed [`Contract`] collides with other [`Contract`]s.
    #[display("{_0}")]
    Overlap(Overlap),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::ContractCancelled(_) => Kind::AlreadyTerminal,
            Self::ContractNotExists(_) => Kind::NotFound,
            Self::Db(e) => e.kind(),
            Self::InvalidRange(_) => Kind::InvalidRange,
            Self::Overlap(_) => Kind::Overlap,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CancelContract,
        error::{Categorize as _, Kind},
        fixture::{self, actor, book, date, money, seed},
        Command as _,
    };

    use super::RenewContract;

    #[tokio::test]
    async fn extends_till_next_booking() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c =
            book(&svc, unit.id, tenant.id, "2024-01-01", Some("2024-03-31"))
                .await
                .unwrap();
        _ = book(&svc, unit.id, tenant.id, "2024-07-01", None)
            .await
            .unwrap();

        let renewed = svc
            .execute(RenewContract {
                contract_id: c.id,
                initiator_id: actor(),
                end: Some(date("2024-06-30")),
                price: Some(money("120")),
            })
            .await
            .unwrap();
        assert_eq!(renewed.period.end(), Some(date("2024-06-30")));
        assert_eq!(renewed.price, money("120"));

        let err = svc
            .execute(RenewContract {
                contract_id: c.id,
                initiator_id: actor(),
                end: None,
                price: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Overlap);
    }

    #[tokio::test]
    async fn rejects_end_before_start() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();

        let err = svc
            .execute(RenewContract {
                contract_id: c.id,
                initiator_id: actor(),
                end: Some(date("2023-12-31")),
                price: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidRange);
    }

    #[tokio::test]
    async fn rejects_cancelled() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();
        _ = svc
            .execute(CancelContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();

        let err = svc
            .execute(RenewContract {
                contract_id: c.id,
                initiator_id: actor(),
                end: Some(date("2024-12-31")),
                price: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::AlreadyTerminal);
    }
}
