//! [`Command`] for cancelling a [`Contract`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, unit, user, Contract, Unit},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Contract`].
///
/// Cancelled [`Contract`]s stop occupying their [`Unit`] and never become
/// active again.
#[derive(Clone, Copy, Debug)]
pub struct CancelContract {
    /// ID of the [`Contract`] to cancel.
    pub contract_id: contract::Id,

    /// ID of the user cancelling the [`Contract`].
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<CancelContract> for Service<Db, Clk>
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
        cmd: CancelContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelContract {
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
            .cancel()
            .map_err(|_| E::ContractCancelled(contract_id))
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

/// Error of [`CancelContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is cancelled already.
    #[display("`Contract(id: {_0})` is cancelled already")]
    ContractCancelled(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::ContractCancelled(_) => Kind::AlreadyTerminal,
            Self::ContractNotExists(_) => Kind::NotFound,
            Self::Db(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::contract::Status,
        error::{Categorize as _, Kind},
        fixture::{self, actor, book, seed},
        Command as _,
    };

    use super::CancelContract;

    #[tokio::test]
    async fn frees_the_unit_once() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();
        let cancel = CancelContract {
            contract_id: c.id,
            initiator_id: actor(),
        };

        let cancelled = svc.execute(cancel).await.unwrap();
        assert_eq!(cancelled.status, Status::Cancelled);

        _ = book(&svc, unit.id, tenant.id, "2024-02-01", None)
            .await
            .unwrap();

        let err = svc.execute(cancel).await.unwrap_err();
        assert_eq!(err.kind(), Kind::AlreadyTerminal);
    }
}
