//! [`Command`] for finalizing a [`Contract`] early.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, InvalidPeriod, TransitionError},
        unit, user, Contract, Unit,
    },
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for finalizing a [`Contract`] early, making today its last
/// day.
#[derive(Clone, Copy, Debug)]
pub struct FinalizeContract {
    /// ID of the [`Contract`] to finalize.
    pub contract_id: contract::Id,

    /// ID of the user finalizing the [`Contract`].
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<FinalizeContract> for Service<Db, Clk>
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
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: FinalizeContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let FinalizeContract {
            contract_id,
            initiator_id,
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

        // Avoid concurrent modifications of the `Unit` bookings.
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

        contract
            .finalize_early(self.clock().today())
            .map_err(|e| match e {
                TransitionError::AlreadyCancelled => {
                    E::ContractCancelled(contract_id)
                }
                TransitionError::AlreadyFinished => {
                    E::ContractFinished(contract_id)
                }
                TransitionError::NotStarted(e) => E::NotStarted(e),
            })
            .map_err(tracerr::wrap!())?;
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

/// Error of [`FinalizeContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is cancelled.
    #[display("`Contract(id: {_0})` is cancelled")]
    ContractCancelled(#[error(not(source))] contract::Id),

    /// [`Contract`] has ended already.
    #[display("`Contract(id: {_0})` has ended already")]
    ContractFinished(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Contract`] hasn't started yet, so ending it today is impossible.
    #[display("`Contract` hasn't started yet: {_0}")]
    NotStarted(InvalidPeriod),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::ContractCancelled(_) | Self::ContractFinished(_) => {
                Kind::AlreadyTerminal
            }
            Self::ContractNotExists(_) => Kind::NotFound,
            Self::Db(e) => e.kind(),
            Self::NotStarted(_) => Kind::InvalidRange,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::contract::Status,
        error::{Categorize as _, Kind},
        fixture::{self, actor, book, date, seed},
        query::contract::ById,
        Command as _, Query as _,
    };

    use super::FinalizeContract;

    #[tokio::test]
    async fn ends_contract_today() {
        let (svc, clock) = fixture::service("2024-03-15");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();

        let done = svc
            .execute(FinalizeContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        assert_eq!(done.period.end(), Some(date("2024-03-15")));
        assert_eq!(done.status, Status::Active);

        clock.set(date("2024-03-16"));
        assert_eq!(done.status_on(date("2024-03-16")), Status::Finished);
        _ = book(&svc, unit.id, tenant.id, "2024-03-16", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn keeps_finished_contract_intact() {
        let (svc, _) = fixture::service("2024-03-15");
        let (_, unit, tenant) = seed(&svc).await;
        let past =
            book(&svc, unit.id, tenant.id, "2024-01-01", Some("2024-01-31"))
                .await
                .unwrap();
        let next = book(&svc, unit.id, tenant.id, "2024-02-01", None)
            .await
            .unwrap();

        let err = svc
            .execute(FinalizeContract {
                contract_id: past.id,
                initiator_id: actor(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::AlreadyTerminal);

        let stored = svc
            .execute(ById::by(past.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.period.end(), Some(date("2024-01-31")));
        assert!(!stored.period.overlaps(&next.period));
    }

    #[tokio::test]
    async fn finalizes_on_last_day() {
        let (svc, _) = fixture::service("2024-03-31");
        let (_, unit, tenant) = seed(&svc).await;
        let c =
            book(&svc, unit.id, tenant.id, "2024-03-01", Some("2024-03-31"))
                .await
                .unwrap();

        let done = svc
            .execute(FinalizeContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        assert_eq!(done.period.end(), Some(date("2024-03-31")));
        assert_eq!(done.status, Status::Active);
    }

    #[tokio::test]
    async fn rejects_not_started() {
        let (svc, _) = fixture::service("2024-03-15");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-04-01", None)
            .await
            .unwrap();

        let err = svc
            .execute(FinalizeContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidRange);
    }
}
