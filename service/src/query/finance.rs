//! [`Query`] collection related to finances.

use common::{
    operations::{By, Select},
    Clock, Percent, YearMonth,
};
use serde::Serialize;
use tracerr::Traced;

use crate::{
    domain::{loan, premises, Contract, Expense, Income, Loan},
    infra::{database, Database},
    read::{self, ledger::Totals, loan::Summary, unit::Occupancy},
    Service,
};
#[cfg(doc)]
use crate::{domain::Premises, Config};

use super::{unit::Snapshot, Query};

/// [`Query`] for [`Contract`]s active today whose deposit is not paid yet.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PendingDeposits(pub Option<premises::Id>);

impl<Db, Clk> Query<PendingDeposits> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
        Select<By<Vec<Contract>, Option<premises::Id>>>,
        Ok = Vec<Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        PendingDeposits(premises_id): PendingDeposits,
    ) -> Result<Self::Ok, Self::Err> {
        let today = self.clock().today();
        let mut contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(premises_id)))
            .await
            .map_err(tracerr::wrap!())?;
        contracts.retain(|c| c.is_active_on(today) && c.has_unpaid_deposit());
        Ok(contracts)
    }
}

/// [`Query`] for active [`Contract`]s ending within the provided number of
/// days from today (inclusive), ordered by their end.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UpcomingExpirations {
    /// Number of days to look ahead.
    ///
    /// [`Config::expiring_within_days`] is used if [`None`].
    pub within_days: Option<u16>,

    /// ID of the [`Premises`] to look in, if not all of them.
    pub premises_id: Option<premises::Id>,
}

impl<Db, Clk> Query<UpcomingExpirations> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
        Select<By<Vec<Contract>, Option<premises::Id>>>,
        Ok = Vec<Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        query: UpcomingExpirations,
    ) -> Result<Self::Ok, Self::Err> {
        let UpcomingExpirations {
            within_days,
            premises_id,
        } = query;

        let today = self.clock().today();
        let within = within_days.unwrap_or(self.config().expiring_within_days);
        let mut contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(premises_id)))
            .await
            .map_err(tracerr::wrap!())?;
        contracts.retain(|c| c.expires_within(today, within));
        contracts.sort_by_key(|c| (c.period.end(), c.id));
        Ok(contracts)
    }
}

/// [`Query`] for [`Totals`] of a [`YearMonth`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MonthlyBalance(pub YearMonth);

/// Output of the [`MonthlyBalance`] [`Query`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Balance {
    /// Balanced [`YearMonth`].
    pub month: YearMonth,

    /// [`Totals`] of the [`YearMonth`].
    #[serde(flatten)]
    pub totals: Totals,
}

impl<Db, Clk> Query<MonthlyBalance> for Service<Db, Clk>
where
    Db: Database<
            Select<By<Vec<Income>, read::Window>>,
            Ok = Vec<Income>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Expense>, read::Window>>,
            Ok = Vec<Expense>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Balance;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        MonthlyBalance(month): MonthlyBalance,
    ) -> Result<Self::Ok, Self::Err> {
        let window = read::Window::month(month);
        let incomes = self
            .database()
            .execute(Select(By::<Vec<Income>, _>::new(window)))
            .await
            .map_err(tracerr::wrap!())?;
        let expenses = self
            .database()
            .execute(Select(By::<Vec<Expense>, _>::new(window)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Balance {
            month,
            totals: Totals::new(&incomes, &expenses),
        })
    }
}

/// [`Query`] for the share of rentable units occupied today.
///
/// Covers all [`Premises`] if no [`premises::Id`] is provided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OccupancyRate(pub Option<premises::Id>);

impl<Db, Clk> Query<OccupancyRate> for Service<Db, Clk>
where
    Self: Query<Snapshot, Ok = Occupancy, Err = Traced<database::Error>>,
{
    type Ok = Percent;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        OccupancyRate(premises_id): OccupancyRate,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Snapshot(premises_id))
            .await
            .map(|o| o.rate())
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] for a [`Summary`] of a [`Loan`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoanSummary(pub loan::Id);

impl<Db, Clk> Query<LoanSummary> for Service<Db, Clk>
where
    Db: Database<
            Select<By<Option<Loan>, loan::Id>>,
            Ok = Option<Loan>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Expense>, loan::Id>>,
            Ok = Vec<Expense>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        LoanSummary(loan_id): LoanSummary,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(loan) = self
            .database()
            .execute(Select(By::<Option<Loan>, _>::new(loan_id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let expenses = self
            .database()
            .execute(Select(By::<Vec<Expense>, _>::new(loan_id)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(Summary::new(loan, &expenses)))
    }
}

/// [`Query`] for [`Summary`]s of all the [`Loan`]s, ordered by their grant
/// date.
///
/// Covers all [`Premises`] if no [`premises::Id`] is provided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Loans(pub Option<premises::Id>);

impl<Db, Clk> Query<Loans> for Service<Db, Clk>
where
    Db: Database<
            Select<By<Vec<Loan>, Option<premises::Id>>>,
            Ok = Vec<Loan>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Expense>, read::Window>>,
            Ok = Vec<Expense>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Loans(premises_id): Loans,
    ) -> Result<Self::Ok, Self::Err> {
        let loans = self
            .database()
            .execute(Select(By::<Vec<Loan>, _>::new(premises_id)))
            .await
            .map_err(tracerr::wrap!())?;
        if loans.is_empty() {
            return Ok(vec![]);
        }

        let expenses = self
            .database()
            .execute(Select(By::<Vec<Expense>, _>::new(
                read::Window::default(),
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(loans
            .into_iter()
            .map(|l| Summary::new(l, &expenses))
            .collect())
    }
}

#[cfg(test)]
mod spec {
    use common::Percent;

    use crate::{
        command::{CreateContract, SetUnitState},
        domain::unit,
        fixture::{self, actor, book, date, money, seed},
        Command as _,
    };

    use super::{OccupancyRate, PendingDeposits, UpcomingExpirations};

    #[tokio::test]
    async fn occupancy_rate_of_nothing_is_zero() {
        let (svc, _) = fixture::service("2024-03-01");

        let rate = svc.execute(OccupancyRate(None)).await.unwrap();
        assert_eq!(rate, Percent::ZERO);
    }

    #[tokio::test]
    async fn occupancy_rate_skips_maintenance() {
        let (svc, _) = fixture::service("2024-03-01");
        let (premises, unit, tenant) = seed(&svc).await;
        let idle = fixture::unit(&svc, premises.id, "A-2").await;
        let broken = fixture::unit(&svc, premises.id, "A-3").await;
        _ = fixture::unit(&svc, premises.id, "A-4").await;
        _ = svc
            .execute(SetUnitState {
                unit_id: broken.id,
                state: unit::State::Maintenance,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        _ = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();
        _ = book(&svc, idle.id, tenant.id, "2024-04-01", None)
            .await
            .unwrap();

        let rate = svc.execute(OccupancyRate(Some(premises.id))).await.unwrap();
        assert_eq!(rate, Percent::ratio(1, 3));
    }

    #[tokio::test]
    async fn lists_expiring_contracts_by_end() {
        let (svc, _) = fixture::service("2024-03-01");
        let (premises, unit, tenant) = seed(&svc).await;
        let other = fixture::unit(&svc, premises.id, "A-2").await;
        let third = fixture::unit(&svc, premises.id, "A-3").await;
        let late =
            book(&svc, unit.id, tenant.id, "2024-01-01", Some("2024-03-31"))
                .await
                .unwrap();
        let soon =
            book(&svc, other.id, tenant.id, "2024-02-01", Some("2024-03-10"))
                .await
                .unwrap();
        _ = book(&svc, third.id, tenant.id, "2024-01-01", Some("2024-06-30"))
            .await
            .unwrap();

        let expiring = svc
            .execute(UpcomingExpirations {
                within_days: None,
                premises_id: None,
            })
            .await
            .unwrap();
        let ids = expiring.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids, [soon.id, late.id]);

        let expiring = svc
            .execute(UpcomingExpirations {
                within_days: Some(9),
                premises_id: Some(premises.id),
            })
            .await
            .unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, soon.id);
    }

    #[tokio::test]
    async fn lists_unpaid_deposits_of_active_contracts() {
        let (svc, _) = fixture::service("2024-03-01");
        let (premises, unit, tenant) = seed(&svc).await;
        let other = fixture::unit(&svc, premises.id, "A-2").await;
        let unpaid = svc
            .execute(CreateContract {
                initiator_id: actor(),
                unit_id: unit.id,
                tenant_id: tenant.id,
                start: date("2024-01-01"),
                end: None,
                price: money("100"),
                deposit: Some(money("100")),
                deposit_paid: false,
            })
            .await
            .unwrap();
        _ = svc
            .execute(CreateContract {
                initiator_id: actor(),
                unit_id: other.id,
                tenant_id: tenant.id,
                start: date("2024-01-01"),
                end: None,
                price: money("100"),
                deposit: Some(money("100")),
                deposit_paid: true,
            })
            .await
            .unwrap();

        let pending = svc.execute(PendingDeposits(None)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, unpaid.id);
    }
}
