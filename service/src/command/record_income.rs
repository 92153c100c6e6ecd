//! [`Command`] for recording a new [`Income`].

use common::{
    operations::{By, Insert, Select},
    Clock, Date, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract, income,
        ledger::{Description, Method},
        user, Audit, Contract, Income,
    },
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a new [`Income`] received under a [`Contract`].
#[derive(Clone, Debug)]
pub struct RecordIncome {
    /// ID of the user recording the [`Income`].
    pub initiator_id: user::Id,

    /// ID of the [`Contract`] the [`Income`] is received under.
    pub contract_id: contract::Id,

    /// Received amount.
    pub amount: Money,

    /// [`Date`] the [`Income`] was received on.
    pub paid_on: Date,

    /// [`income::Category`] of the [`Income`].
    pub category: income::Category,

    /// Payment [`Method`], if known.
    pub method: Option<Method>,

    /// Free-form [`Description`], if any.
    pub description: Option<Description>,
}

impl<Db, Clk> Command<RecordIncome> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<Insert<Income>, Err = Traced<database::Error>>,
{
    type Ok = Income;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecordIncome,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordIncome {
            initiator_id,
            contract_id,
            amount,
            paid_on,
            category,
            method,
            description,
        } = cmd;

        if amount.is_zero() {
            return Err(tracerr::new!(E::ZeroAmount));
        }

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let income = Income {
            id: income::Id::new(),
            contract_id: contract.id,
            amount,
            paid_on,
            category,
            method,
            description,
            audit: Audit::new(self.clock().now(), Some(initiator_id)),
        };

        self.database()
            .execute(Insert(income.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Income(id: {})` of {amount} recorded for `Contract(id: {})`",
            income.id,
            contract.id,
        );
        Ok(income)
    }
}

/// Error of [`RecordIncome`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Income`] amount is zero.
    #[display("`Income` amount must be positive")]
    ZeroAmount,
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::ContractNotExists(_) => Kind::NotFound,
            Self::Db(e) => e.kind(),
            Self::ZeroAmount => Kind::InvalidValue,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::DeleteContract,
        domain::{contract, income::Category},
        error::{Categorize as _, Kind},
        fixture::{self, actor, book, date, money, seed},
        Command as _,
    };

    use super::RecordIncome;

    fn rent(contract_id: contract::Id, amount: &str) -> RecordIncome {
        RecordIncome {
            initiator_id: actor(),
            contract_id,
            amount: money(amount),
            paid_on: date("2024-03-01"),
            category: Category::Rent,
            method: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn requires_live_contract_and_amount() {
        let (svc, _) = fixture::service("2024-03-01");
        let (_, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();

        let err = svc.execute(rent(c.id, "0")).await.unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidValue);

        let income = svc.execute(rent(c.id, "99.90")).await.unwrap();
        assert_eq!(income.contract_id, c.id);

        _ = svc
            .execute(DeleteContract {
                contract_id: c.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        let err = svc.execute(rent(c.id, "10")).await.unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
