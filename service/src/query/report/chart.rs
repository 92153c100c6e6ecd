//! [`Chart`] definition.

use common::{
    operations::{By, Select},
    Clock, Date,
};
use derive_more::Display;
use serde::Serialize;
use strum::EnumString;
use tracerr::Traced;

use crate::{
    domain::{Expense, Income},
    infra::{database, Database},
    read::{self, ledger::Totals},
    Query, Service,
};

/// [`Query`] for a time series of [`Income`]s against [`Expense`]s over a
/// [`Period`] ending today.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Chart(pub Period);

/// Time span of a [`Chart`].
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq, Serialize)]
pub enum Period {
    /// Last 30 days, bucketed by day.
    #[display("1m")]
    #[serde(rename = "1m")]
    #[strum(serialize = "1m")]
    OneMonth,

    /// Last 3 calendar months, bucketed by month.
    #[display("3m")]
    #[serde(rename = "3m")]
    #[strum(serialize = "3m")]
    ThreeMonths,

    /// Last 6 calendar months, bucketed by month.
    #[display("6m")]
    #[serde(rename = "6m")]
    #[strum(serialize = "6m")]
    SixMonths,

    /// Last 12 calendar months, bucketed by month.
    #[display("1y")]
    #[serde(rename = "1y")]
    #[strum(serialize = "1y")]
    OneYear,
}

impl Period {
    /// Number of days in a [`Period::OneMonth`].
    const DAYS: i64 = 30;

    /// Splits this [`Period`] ending on the provided `today` into
    /// consecutive buckets.
    #[must_use]
    pub fn buckets(self, today: Date) -> Vec<read::Window> {
        let months = match self {
            Self::OneMonth => {
                return (1 - Self::DAYS..=0)
                    .filter_map(|n| today.add_days(n))
                    .map(|d| read::Window::between(d, d))
                    .collect();
            }
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::OneYear => 12,
        };
        let current = today.year_month();
        (1 - months..=0)
            .filter_map(|n| current.add_months(n))
            .map(read::Window::month)
            .collect()
    }
}

/// Output of the [`Chart`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Output {
    /// Charted [`Period`].
    pub period: Period,

    /// [`Point`]s of the chart, in chronological order.
    pub points: Vec<Point>,
}

/// Single bucket of a [`Chart`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Point {
    /// First day of this [`Point`].
    pub from: Date,

    /// Last day of this [`Point`].
    pub to: Date,

    /// [`Totals`] of this [`Point`].
    #[serde(flatten)]
    pub totals: Totals,
}

impl<Db, Clk> Query<Chart> for Service<Db, Clk>
where
    Clk: Clock,
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
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Chart(period): Chart,
    ) -> Result<Self::Ok, Self::Err> {
        let buckets = period.buckets(self.clock().today());
        let (Some(first), Some(last)) = (buckets.first(), buckets.last())
        else {
            return Ok(Output {
                period,
                points: vec![],
            });
        };
        let window = read::Window {
            from: first.from,
            to: last.to,
        };

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

        let points = buckets
            .into_iter()
            .filter_map(|b| {
                Some(Point {
                    from: b.from?,
                    to: b.to?,
                    totals: Totals::new(
                        incomes.iter().filter(|i| b.contains(i.paid_on)),
                        expenses.iter().filter(|e| b.contains(e.spent_on)),
                    ),
                })
            })
            .collect();

        Ok(Output { period, points })
    }
}

#[cfg(test)]
mod spec {
    use common::Date;

    use super::Period;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn parses_period() {
        assert_eq!("1m".parse::<Period>().unwrap(), Period::OneMonth);
        assert_eq!("1y".parse::<Period>().unwrap(), Period::OneYear);
        assert_eq!(Period::SixMonths.to_string(), "6m");
        assert!("2w".parse::<Period>().is_err());
    }

    #[test]
    fn buckets_one_month_by_day() {
        let buckets = Period::OneMonth.buckets(date("2024-03-10"));

        assert_eq!(buckets.len(), 30);
        assert_eq!(buckets[0].from, Some(date("2024-02-10")));
        assert_eq!(buckets[29].to, Some(date("2024-03-10")));
        assert!(buckets.iter().all(|b| b.from == b.to));
    }

    #[test]
    fn buckets_longer_periods_by_month() {
        let buckets = Period::ThreeMonths.buckets(date("2024-02-10"));

        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].from, Some(date("2023-12-01")));
        assert_eq!(buckets[0].to, Some(date("2023-12-31")));
        assert_eq!(buckets[2].from, Some(date("2024-02-01")));
        assert_eq!(buckets[2].to, Some(date("2024-02-29")));

        assert_eq!(Period::OneYear.buckets(date("2024-02-10")).len(), 12);
    }
}
