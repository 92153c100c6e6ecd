//! [`Command`] for creating a new [`Loan`].

use common::{
    operations::{By, Insert, Select},
    Clock, Date, Money, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{loan, premises, user, Audit, Loan, Premises},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Loan`] financing [`Premises`].
#[derive(Clone, Debug)]
pub struct CreateLoan {
    /// ID of the user creating the [`Loan`].
    pub initiator_id: user::Id,

    /// ID of the financed [`Premises`].
    pub premises_id: premises::Id,

    /// Borrowed amount.
    pub principal: Money,

    /// Total amount to repay, interest included.
    pub total: Money,

    /// Interest rate, if known.
    pub rate: Option<Percent>,

    /// [`Date`] the [`Loan`] was granted on.
    pub granted_on: Date,

    /// [`loan::Lender`], if known.
    pub lender: Option<loan::Lender>,
}

impl<Db, Clk> Command<CreateLoan> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Option<Premises>, premises::Id>>,
            Ok = Option<Premises>,
            Err = Traced<database::Error>,
        > + Database<Insert<Loan>, Err = Traced<database::Error>>,
{
    type Ok = Loan;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateLoan) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateLoan {
            initiator_id,
            premises_id,
            principal,
            total,
            rate,
            granted_on,
            lender,
        } = cmd;

        if principal.is_zero() {
            return Err(tracerr::new!(E::ZeroPrincipal));
        }
        if total < principal {
            return Err(tracerr::new!(E::TotalBelowPrincipal {
                principal,
                total,
            }));
        }

        let premises = self
            .database()
            .execute(Select(By::<Option<Premises>, _>::new(premises_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PremisesNotExists(premises_id))
            .map_err(tracerr::wrap!())?;

        let loan = Loan {
            id: loan::Id::new(),
            premises_id: premises.id,
            principal,
            total,
            rate,
            granted_on,
            lender,
            status: loan::Status::Active,
            audit: Audit::new(self.clock().now(), Some(initiator_id)),
        };

        self.database()
            .execute(Insert(loan.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Loan(id: {})` of {principal} granted for \
             `Premises(id: {premises_id})`",
            loan.id,
        );
        Ok(loan)
    }
}

/// Error of [`CreateLoan`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Premises`] with the provided ID does not exist.
    #[display("`Premises(id: {_0})` does not exist")]
    PremisesNotExists(#[error(not(source))] premises::Id),

    /// Total to repay is less than the borrowed amount.
    #[display("`Loan` total {total} is less than its principal {principal}")]
    TotalBelowPrincipal {
        /// Borrowed amount.
        #[error(not(source))]
        principal: Money,

        /// Total to repay.
        #[error(not(source))]
        total: Money,
    },

    /// Borrowed amount is zero.
    #[display("`Loan` principal must be positive")]
    ZeroPrincipal,
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::PremisesNotExists(_) => Kind::NotFound,
            Self::TotalBelowPrincipal { .. } | Self::ZeroPrincipal => {
                Kind::InvalidValue
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use crate::{
        domain::{loan, premises},
        error::{Categorize as _, Kind},
        fixture::{self, actor, date, money},
        query::finance::{LoanSummary, Loans},
        Command as _,
    };

    use super::CreateLoan;

    fn borrow(
        premises_id: premises::Id,
        principal: &str,
        total: &str,
    ) -> CreateLoan {
        CreateLoan {
            initiator_id: actor(),
            premises_id,
            principal: money(principal),
            total: money(total),
            rate: None,
            granted_on: date("2024-01-15"),
            lender: loan::Lender::new("Bank"),
        }
    }

    #[tokio::test]
    async fn validates_amounts() {
        let (svc, _) = fixture::service("2024-03-01");
        let premises = fixture::premises(&svc, "Depot").await;

        let err =
            svc.execute(borrow(premises.id, "0", "10")).await.unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidValue);

        let err = svc
            .execute(borrow(premises.id, "1000", "900"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidValue);

        let err = svc
            .execute(borrow(premises::Id::new(), "1000", "1100"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }

    #[tokio::test]
    async fn amortizes_by_repayments() {
        let (svc, _) = fixture::service("2024-03-01");
        let premises = fixture::premises(&svc, "Depot").await;
        let l = svc
            .execute(borrow(premises.id, "1000", "1200"))
            .await
            .unwrap();
        assert_eq!(l.status, loan::Status::Active);

        let repay = Some(l.id);
        _ = fixture::expense(&svc, premises.id, repay, "700", "2024-02-01")
            .await;
        _ = fixture::expense(&svc, premises.id, None, "50", "2024-02-02")
            .await;

        let summary = svc.execute(LoanSummary(l.id)).await.unwrap().unwrap();
        assert_eq!(summary.amortized, dec!(700));
        assert_eq!(summary.outstanding, dec!(500));
        assert!(!summary.is_repaid());

        _ = fixture::expense(&svc, premises.id, repay, "600", "2024-03-01")
            .await;
        let all = svc.execute(Loans(None)).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].outstanding, dec!(0));
        assert!(all[0].is_repaid());

        assert!(svc
            .execute(LoanSummary(loan::Id::new()))
            .await
            .unwrap()
            .is_none());
    }
}
