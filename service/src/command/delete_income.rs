//! [`Command`] for soft-deleting an [`Income`].

use common::{
    operations::{By, Select, Update},
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{income, user, Income},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for soft-deleting an [`Income`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteIncome {
    /// ID of the [`Income`] to delete.
    pub income_id: income::Id,

    /// ID of the user deleting the [`Income`].
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<DeleteIncome> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Option<Income>, income::Id>>,
            Ok = Option<Income>,
            Err = Traced<database::Error>,
        > + Database<Update<Income>, Err = Traced<database::Error>>,
{
    type Ok = Income;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteIncome,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteIncome {
            income_id,
            initiator_id,
        } = cmd;

        let mut income = self
            .database()
            .execute(Select(By::<Option<Income>, _>::new(income_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::IncomeNotExists(income_id))
            .map_err(tracerr::wrap!())?;

        let now = self.clock().now();
        income.audit.touch(now, initiator_id);
        income.audit.soft_delete(now, initiator_id);

        self.database()
            .execute(Update(income.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(income)
    }
}

/// Error of [`DeleteIncome`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Income`] with the provided ID does not exist.
    #[display("`Income(id: {_0})` does not exist")]
    IncomeNotExists(#[error(not(source))] income::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::IncomeNotExists(_) => Kind::NotFound,
        }
    }
}
