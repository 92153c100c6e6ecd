//! [`Command`] for restoring a soft-deleted [`Contract`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, unit, user, Contract, Unit},
    error::{Categorize, Kind},
    infra::{database, Database},
    read::{self, IncludingDeleted},
    Service,
};

use super::{Command, Overlap};

/// [`Command`] for restoring a soft-deleted [`Contract`].
///
/// Restoring a non-deleted [`Contract`] is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct RestoreContract {
    /// ID of the [`Contract`] to restore.
    pub contract_id: contract::Id,

    /// ID of the user restoring the [`Contract`].
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<RestoreContract> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Contract>, IncludingDeleted<contract::Id>>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Unit, unit::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, IncludingDeleted<contract::Id>>>,
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
        cmd: RestoreContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RestoreContract {
            contract_id,
            initiator_id,
        } = cmd;

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(IncludingDeleted(
                contract_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if !contract.audit.is_deleted() {
            return Ok(contract);
        }

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
            .execute(Select(By::<Option<Contract>, _>::new(IncludingDeleted(
                contract_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if !contract.audit.is_deleted() {
            return Ok(contract);
        }

        // Cancelled `Contract`s never occupy their `Unit`.
        if !contract.is_cancelled() {
            let conflicting = tx
                .execute(Select(By::<Vec<Contract>, _>::new(
                    read::contract::Overlapping {
                        unit_id: contract.unit_id,
                        period: contract.period,
                        exclude: Some(contract.id),
                    },
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if let Some(overlap) =
                Overlap::detect(contract.unit_id, &conflicting)
            {
                log::debug!("`RestoreContract` rejected: {overlap}");
                return Err(tracerr::new!(E::Overlap(overlap)));
            }
        }

        contract.audit.restore();
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

        log::info!("`Contract(id: {contract_id})` restored");
        Ok(contract)
    }
}

/// Error of [`RestoreContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID never existed.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Restored [`Contract`] would collide with other [`Contract`]s.
    #[display("{_0}")]
    Overlap(Overlap),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::ContractNotExists(_) => Kind::NotFound,
            Self::Db(e) => e.kind(),
            Self::Overlap(_) => Kind::Overlap,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::DeleteContract,
        error::{Categorize as _, Kind},
        fixture::{self, actor, book, date, seed},
        query::contract::FindOverlapping,
        Command as _,
    };

    use super::RestoreContract;

    #[tokio::test]
    async fn deleted_contract_reappears_once_restored() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c =
            book(&svc, unit.id, tenant.id, "2024-01-01", Some("2024-12-31"))
                .await
                .unwrap();
        let lookup = FindOverlapping {
            unit_id: unit.id,
            start: date("2024-06-01"),
            end: Some(date("2024-06-30")),
            exclude: None,
        };

        let deleted = svc
            .execute(DeleteContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        assert!(deleted.audit.deleted_at.is_some());
        assert!(svc.execute(lookup).await.unwrap().is_empty());

        let restored = svc
            .execute(RestoreContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        assert!(restored.audit.deleted_at.is_none());
        assert_eq!(restored.period, c.period);
        assert_eq!(restored.price, c.price);
        assert_eq!(restored.status, c.status);

        let found = svc.execute(lookup).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, c.id);
    }

    #[tokio::test]
    async fn rejects_restoring_into_taken_dates() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();
        _ = svc
            .execute(DeleteContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        let newer = book(&svc, unit.id, tenant.id, "2024-02-01", None)
            .await
            .unwrap();

        let err = svc
            .execute(RestoreContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Overlap);
        assert!(err.as_ref().to_string().contains(&newer.id.to_string()));
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();
        let delete = DeleteContract {
            contract_id: c.id,
            initiator_id: actor(),
        };

        _ = svc.execute(delete).await.unwrap();
        let err = svc.execute(delete).await.unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
