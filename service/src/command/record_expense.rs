//! [`Command`] for recording a new [`Expense`].

use common::{
    operations::{By, Insert, Select},
    Clock, Date, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        expense,
        ledger::{Description, Method},
        loan, premises, user, Audit, Expense, Loan, Premises,
    },
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a new [`Expense`] of [`Premises`].
#[derive(Clone, Debug)]
pub struct RecordExpense {
    /// ID of the user recording the [`Expense`].
    pub initiator_id: user::Id,

    /// ID of the [`Premises`] the [`Expense`] is spent on.
    pub premises_id: premises::Id,

    /// ID of the [`Loan`] repaid by the [`Expense`], if any.
    pub loan_id: Option<loan::Id>,

    /// Spent amount.
    pub amount: Money,

    /// [`Date`] the [`Expense`] was spent on.
    pub spent_on: Date,

    /// [`expense::Category`] of the [`Expense`].
    pub category: expense::Category,

    /// Payment [`Method`], if known.
    pub method: Option<Method>,

    /// Free-form [`Description`], if any.
    pub description: Option<Description>,
}

impl<Db, Clk> Command<RecordExpense> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Option<Premises>, premises::Id>>,
            Ok = Option<Premises>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Loan>, loan::Id>>,
            Ok = Option<Loan>,
            Err = Traced<database::Error>,
        > + Database<Insert<Expense>, Err = Traced<database::Error>>,
{
    type Ok = Expense;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecordExpense,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordExpense {
            initiator_id,
            premises_id,
            loan_id,
            amount,
            spent_on,
            category,
            method,
            description,
        } = cmd;

        if amount.is_zero() {
            return Err(tracerr::new!(E::ZeroAmount));
        }

        let premises = self
            .database()
            .execute(Select(By::<Option<Premises>, _>::new(premises_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PremisesNotExists(premises_id))
            .map_err(tracerr::wrap!())?;

        if let Some(loan_id) = loan_id {
            let loan = self
                .database()
                .execute(Select(By::<Option<Loan>, _>::new(loan_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if loan.map_or(true, |l| l.premises_id != premises.id) {
                log::debug!(
                    "`RecordExpense` rejected: `Loan(id: {loan_id})` is not \
                     granted for `Premises(id: {premises_id})`",
                );
                return Err(tracerr::new!(E::ForeignLoan(loan_id)));
            }
        }

        let expense = Expense {
            id: expense::Id::new(),
            premises_id: premises.id,
            loan_id,
            amount,
            spent_on,
            category,
            method,
            description,
            audit: Audit::new(self.clock().now(), Some(initiator_id)),
        };

        self.database()
            .execute(Insert(expense.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Expense(id: {})` of {amount} recorded for \
             `Premises(id: {premises_id})`",
            expense.id,
        );
        Ok(expense)
    }
}

/// Error of [`RecordExpense`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Loan`] doesn't exist or is granted for other [`Premises`].
    #[display("`Loan(id: {_0})` doesn't belong to the `Premises`")]
    ForeignLoan(#[error(not(source))] loan::Id),

    /// [`Premises`] with the provided ID does not exist.
    #[display("`Premises(id: {_0})` does not exist")]
    PremisesNotExists(#[error(not(source))] premises::Id),

    /// [`Expense`] amount is zero.
    #[display("`Expense` amount must be positive")]
    ZeroAmount,
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::ForeignLoan(_) | Self::ZeroAmount => Kind::InvalidValue,
            Self::PremisesNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CreateLoan,
        domain::expense::Category,
        error::{Categorize as _, Kind},
        fixture::{self, actor, date, money},
        Command as _,
    };

    use super::RecordExpense;

    #[tokio::test]
    async fn rejects_loans_of_other_premises() {
        let (svc, _) = fixture::service("2024-03-01");
        let north = fixture::premises(&svc, "North").await;
        let south = fixture::premises(&svc, "South").await;
        let loan = svc
            .execute(CreateLoan {
                initiator_id: actor(),
                premises_id: south.id,
                principal: money("100"),
                total: money("100"),
                rate: None,
                granted_on: date("2024-01-01"),
                lender: None,
            })
            .await
            .unwrap();

        let err = svc
            .execute(RecordExpense {
                initiator_id: actor(),
                premises_id: north.id,
                loan_id: Some(loan.id),
                amount: money("10"),
                spent_on: date("2024-02-01"),
                category: Category::LoanPayment,
                method: None,
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidValue);

        let ok =
            fixture::expense(&svc, south.id, Some(loan.id), "10", "2024-02-01")
                .await;
        assert!(ok.repays(loan.id));
    }
}
