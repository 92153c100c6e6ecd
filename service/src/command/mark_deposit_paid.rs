//! [`Command`] for marking a [`Contract`] deposit as paid.

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

/// [`Command`] for marking a [`Contract`] deposit as paid.
///
/// Marking an already paid deposit is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct MarkDepositPaid {
    /// ID of the [`Contract`] whose deposit is paid.
    pub contract_id: contract::Id,

    /// ID of the user registering the payment.
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<MarkDepositPaid> for Service<Db, Clk>
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
        cmd: MarkDepositPaid,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkDepositPaid {
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
        if contract.deposit.is_none() {
            return Err(tracerr::new!(E::NoDeposit(contract_id)));
        }
        if contract.deposit_paid {
            return Ok(contract);
        }

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
        if contract.deposit.is_none() {
            return Err(tracerr::new!(E::NoDeposit(contract_id)));
        }

        contract.deposit_paid = true;
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

/// Error of [`MarkDepositPaid`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Contract`] has no deposit to pay.
    #[display("`Contract(id: {_0})` has no deposit")]
    NoDeposit(#[error(not(source))] contract::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::ContractNotExists(_) => Kind::NotFound,
            Self::Db(e) => e.kind(),
            Self::NoDeposit(_) => Kind::InvalidValue,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CreateContract,
        error::{Categorize as _, Kind},
        fixture::{self, actor, book, date, money, seed},
        Command as _,
    };

    use super::MarkDepositPaid;

    #[tokio::test]
    async fn marks_once() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c = svc
            .execute(CreateContract {
                initiator_id: actor(),
                unit_id: unit.id,
                tenant_id: tenant.id,
                start: date("2024-03-01"),
                end: None,
                price: money("100"),
                deposit: Some(money("200")),
                deposit_paid: false,
            })
            .await
            .unwrap();
        assert!(c.has_unpaid_deposit());
        let mark = MarkDepositPaid {
            contract_id: c.id,
            initiator_id: actor(),
        };

        let paid = svc.execute(mark).await.unwrap();
        assert!(paid.deposit_paid);

        let again = svc.execute(mark).await.unwrap();
        assert_eq!(again.audit.updated_at, paid.audit.updated_at);
    }

    #[tokio::test]
    async fn rejects_missing_deposit() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-03-01", None)
            .await
            .unwrap();

        let err = svc
            .execute(MarkDepositPaid {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidValue);
    }
}
