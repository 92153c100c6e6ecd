//! [`Command`] for soft-deleting an [`Expense`].

use common::{
    operations::{By, Select, Update},
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{expense, user, Expense},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for soft-deleting an [`Expense`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteExpense {
    /// ID of the [`Expense`] to delete.
    pub expense_id: expense::Id,

    /// ID of the user deleting the [`Expense`].
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<DeleteExpense> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Option<Expense>, expense::Id>>,
            Ok = Option<Expense>,
            Err = Traced<database::Error>,
        > + Database<Update<Expense>, Err = Traced<database::Error>>,
{
    type Ok = Expense;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteExpense,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteExpense {
            expense_id,
            initiator_id,
        } = cmd;

        let mut expense = self
            .database()
            .execute(Select(By::<Option<Expense>, _>::new(expense_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ExpenseNotExists(expense_id))
            .map_err(tracerr::wrap!())?;

        let now = self.clock().now();
        expense.audit.touch(now, initiator_id);
        expense.audit.soft_delete(now, initiator_id);

        self.database()
            .execute(Update(expense.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(expense)
    }
}

/// Error of [`DeleteExpense`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Expense`] with the provided ID does not exist.
    #[display("`Expense(id: {_0})` does not exist")]
    ExpenseNotExists(#[error(not(source))] expense::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::ExpenseNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::YearMonth;
    use rust_decimal_macros::dec;

    use crate::{
        error::{Categorize as _, Kind},
        fixture::{self, actor, book, seed},
        query::finance::MonthlyBalance,
        Command as _,
    };

    use super::DeleteExpense;

    #[tokio::test]
    async fn deleted_expense_leaves_balance() {
        let (svc, _) = fixture::service("2024-03-20");
        let (premises, unit, tenant) = seed(&svc).await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();
        _ = fixture::income(&svc, c.id, "500", "2024-03-05").await;
        let e = fixture::expense(&svc, premises.id, None, "100", "2024-03-10")
            .await;
        let month = MonthlyBalance(YearMonth::new(2024, 3).unwrap());

        let before = svc.execute(month).await.unwrap();
        assert_eq!(before.totals.net, dec!(400));

        _ = svc
            .execute(DeleteExpense {
                expense_id: e.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();

        let after = svc.execute(month).await.unwrap();
        assert_eq!(after.totals.net - before.totals.net, dec!(100));
        assert_eq!(after.totals.expense, dec!(0));

        let err = svc
            .execute(DeleteExpense {
                expense_id: e.id,
                initiator_id: actor(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
