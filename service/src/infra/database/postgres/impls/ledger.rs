//! [`Income`], [`Expense`] and [`Loan`]-related [`Database`]
//! implementations.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{expense, income, loan, premises, Expense, Income, Loan},
    infra::{
        database::{
            self,
            postgres::{
                live::{self, Live, Param, Table},
                Connection,
            },
            Postgres,
        },
        Database,
    },
    read,
};

use super::impl_table;

impl Table for Income {
    const NAME: &'static str = "incomes";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "contract_id",
        "amount",
        "paid_on",
        "category",
        "method",
        "description",
    ];

    fn from_row(row: &Row) -> Result<Self, Traced<database::Error>> {
        Ok(Self {
            id: row.get("id"),
            contract_id: row.get("contract_id"),
            amount: row.get("amount"),
            paid_on: row.get("paid_on"),
            category: row.get("category"),
            method: row.get("method"),
            description: row.get("description"),
            audit: live::audit_from_row(row),
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Box::new(self.id),
            Box::new(self.contract_id),
            Box::new(self.amount),
            Box::new(self.paid_on),
            Box::new(self.category),
            Box::new(self.method),
            Box::new(self.description.clone()),
        ]
    }
}

impl Table for Expense {
    const NAME: &'static str = "expenses";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "premises_id",
        "loan_id",
        "amount",
        "spent_on",
        "category",
        "method",
        "description",
    ];

    fn from_row(row: &Row) -> Result<Self, Traced<database::Error>> {
        Ok(Self {
            id: row.get("id"),
            premises_id: row.get("premises_id"),
            loan_id: row.get("loan_id"),
            amount: row.get("amount"),
            spent_on: row.get("spent_on"),
            category: row.get("category"),
            method: row.get("method"),
            description: row.get("description"),
            audit: live::audit_from_row(row),
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Box::new(self.id),
            Box::new(self.premises_id),
            Box::new(self.loan_id),
            Box::new(self.amount),
            Box::new(self.spent_on),
            Box::new(self.category),
            Box::new(self.method),
            Box::new(self.description.clone()),
        ]
    }
}

impl Table for Loan {
    const NAME: &'static str = "loans";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "premises_id",
        "principal",
        "total",
        "rate",
        "granted_on",
        "lender",
        "status",
    ];

    fn from_row(row: &Row) -> Result<Self, Traced<database::Error>> {
        Ok(Self {
            id: row.get("id"),
            premises_id: row.get("premises_id"),
            principal: row.get("principal"),
            total: row.get("total"),
            rate: row.get("rate"),
            granted_on: row.get("granted_on"),
            lender: row.get("lender"),
            status: row.get("status"),
            audit: live::audit_from_row(row),
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Box::new(self.id),
            Box::new(self.premises_id),
            Box::new(self.principal),
            Box::new(self.total),
            Box::new(self.rate),
            Box::new(self.granted_on),
            Box::new(self.lender.clone()),
            Box::new(self.status),
        ]
    }
}

impl_table! {
    Income: income::Id,
    Expense: expense::Id,
    Loan: loan::Id,
}

impl<C> Database<Select<By<Vec<Income>, read::Window>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Income>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Income>, read::Window>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::Window { from, to } = by.into_inner();

        let sql = Live::<Income>::select()
            .filter("($1::DATE IS NULL OR paid_on >= $1::DATE)")
            .filter("($2::DATE IS NULL OR paid_on <= $2::DATE)")
            .order_by("paid_on, id")
            .sql();
        let rows = self
            .query(&sql, &[&from, &to])
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}

impl<C> Database<Select<By<Vec<Expense>, read::Window>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Expense>, read::Window>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::Window { from, to } = by.into_inner();

        let sql = Live::<Expense>::select()
            .filter("($1::DATE IS NULL OR spent_on >= $1::DATE)")
            .filter("($2::DATE IS NULL OR spent_on <= $2::DATE)")
            .order_by("spent_on, id")
            .sql();
        let rows = self
            .query(&sql, &[&from, &to])
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}

impl<C> Database<Select<By<Vec<Expense>, loan::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Expense>, loan::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let loan_id = by.into_inner();

        let sql = Live::<Expense>::select()
            .filter("loan_id = $1::UUID")
            .order_by("spent_on, id")
            .sql();
        let rows = self
            .query(&sql, &[&loan_id])
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}

impl<C> Database<Select<By<Vec<Loan>, Option<premises::Id>>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Loan>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Loan>, Option<premises::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let premises_id = by.into_inner();

        let sql = Live::<Loan>::select()
            .filter("($1::UUID IS NULL OR premises_id = $1::UUID)")
            .order_by("granted_on, id")
            .sql();
        let rows = self
            .query(&sql, &[&premises_id])
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}
