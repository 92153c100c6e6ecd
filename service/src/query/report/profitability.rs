//! [`Profitability`] definition.

use std::collections::HashMap;

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use serde::Serialize;
use tracerr::Traced;

use crate::{
    domain::{premises, Contract, Expense, Income, Premises, Unit},
    error::{Categorize, Kind},
    infra::{database, Database},
    read::{self, ledger::Totals},
    Query, Service,
};

/// [`Query`] for [`Totals`] of every [`Premises`] over an inclusive window
/// of [`Date`]s.
///
/// [`Income`]s are attributed to [`Premises`] via [`Contract`]s of their
/// [`Unit`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Profitability {
    /// First day of the window, if bounded.
    pub from: Option<Date>,

    /// Last day of the window, if bounded.
    pub to: Option<Date>,
}

/// Output of the [`Profitability`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Output {
    /// First day of the window, if bounded.
    pub from: Option<Date>,

    /// Last day of the window, if bounded.
    pub to: Option<Date>,

    /// [`Row`]s per [`Premises`], ordered by their name.
    pub rows: Vec<Row>,

    /// [`Totals`] of all the [`Row`]s.
    pub totals: Totals,

    /// Margin of the [`Output::totals`] in percents, if there is income.
    pub margin: Option<Decimal>,
}

/// [`Profitability`] of a single [`Premises`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Row {
    /// ID of the [`Premises`].
    pub premises_id: premises::Id,

    /// Name of the [`Premises`].
    pub name: premises::Name,

    /// [`Totals`] of the [`Premises`].
    #[serde(flatten)]
    pub totals: Totals,

    /// Margin of the [`Premises`] in percents, if there is income.
    pub margin: Option<Decimal>,
}

impl<Db, Clk> Query<Profitability> for Service<Db, Clk>
where
    Db: Database<
            Select<By<Vec<Premises>, ()>>,
            Ok = Vec<Premises>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Unit>, Option<premises::Id>>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Contract>, Option<premises::Id>>>,
            Ok = Vec<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Income>, read::Window>>,
            Ok = Vec<Income>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Expense>, read::Window>>,
            Ok = Vec<Expense>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: Profitability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Profitability { from, to } = query;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(tracerr::new!(E::InvalidRange { from, to }));
            }
        }
        let window = read::Window { from, to };

        let premises = self
            .database()
            .execute(Select(By::<Vec<Premises>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let units = self
            .database()
            .execute(Select(By::<Vec<Unit>, _>::new(None)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .map(|u| (u.id, u.premises_id))
            .collect::<HashMap<_, _>>();
        let contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(None)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter_map(|c| Some((c.id, *units.get(&c.unit_id)?)))
            .collect::<HashMap<_, _>>();
        let incomes = self
            .database()
            .execute(Select(By::<Vec<Income>, _>::new(window)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let expenses = self
            .database()
            .execute(Select(By::<Vec<Expense>, _>::new(window)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let rows = premises
            .into_iter()
            .map(|p| {
                let owned = |i: &&Income| {
                    contracts.get(&i.contract_id) == Some(&p.id)
                };
                let totals = Totals::new(
                    incomes.iter().filter(owned),
                    expenses.iter().filter(|e| e.premises_id == p.id),
                );
                Row {
                    premises_id: p.id,
                    name: p.name,
                    totals,
                    margin: totals.margin(),
                }
            })
            .collect::<Vec<_>>();
        let totals = rows
            .iter()
            .fold(Totals::default(), |acc, r| acc + r.totals);

        Ok(Output {
            from,
            to,
            rows,
            totals,
            margin: totals.margin(),
        })
    }
}

/// Error of [`Profitability`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Window ends before it starts.
    #[display("Window end `{to}` precedes its start `{from}`")]
    InvalidRange {
        /// First day of the window.
        #[error(not(source))]
        from: Date,

        /// Last day of the window.
        #[error(not(source))]
        to: Date,
    },
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::InvalidRange { .. } => Kind::InvalidRange,
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use crate::{
        error::{Categorize as _, Kind},
        fixture::{self, book, date, seed},
        Command as _,
    };

    use super::Profitability;

    #[tokio::test]
    async fn attributes_ledger_to_premises() {
        let (svc, _) = fixture::service("2024-03-20");
        let (north, unit, tenant) = seed(&svc).await;
        let south = fixture::premises(&svc, "South").await;
        let c = book(&svc, unit.id, tenant.id, "2024-01-01", None)
            .await
            .unwrap();
        _ = fixture::income(&svc, c.id, "400", "2024-03-01").await;
        _ = fixture::income(&svc, c.id, "400", "2023-12-01").await;
        _ = fixture::expense(&svc, north.id, None, "100", "2024-03-02").await;
        _ = fixture::expense(&svc, south.id, None, "50", "2024-03-02").await;

        let out = svc
            .execute(Profitability {
                from: Some(date("2024-01-01")),
                to: None,
            })
            .await
            .unwrap();

        assert_eq!(out.rows.len(), 2);
        let north_row = out.rows.iter().find(|r| r.premises_id == north.id);
        let north_row = north_row.unwrap();
        assert_eq!(north_row.totals.income, dec!(400));
        assert_eq!(north_row.totals.net, dec!(300));
        assert_eq!(north_row.margin, Some(dec!(75)));
        let south_row = out.rows.iter().find(|r| r.premises_id == south.id);
        let south_row = south_row.unwrap();
        assert_eq!(south_row.totals.net, dec!(-50));
        assert_eq!(south_row.margin, None);

        assert_eq!(out.totals.income, dec!(400));
        assert_eq!(out.totals.expense, dec!(150));
        assert_eq!(out.margin, Some(dec!(62.5)));
    }

    #[tokio::test]
    async fn rejects_inverted_window() {
        let (svc, _) = fixture::service("2024-03-20");

        let err = svc
            .execute(Profitability {
                from: Some(date("2024-02-01")),
                to: Some(date("2024-01-01")),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidRange);
    }
}
