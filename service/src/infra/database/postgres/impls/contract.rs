//! [`Contract`]-related [`Database`] implementations.

use common::{
    operations::{By, Select},
    Date,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, Period},
        premises, tenant, unit, Contract,
    },
    infra::{
        database::{
            self,
            postgres::{
                self,
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

impl Table for Contract {
    const NAME: &'static str = "contracts";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "unit_id",
        "tenant_id",
        "start_date",
        "end_date",
        "price",
        "deposit",
        "deposit_paid",
        "status",
    ];

    fn from_row(row: &Row) -> Result<Self, Traced<database::Error>> {
        let period = Period::new(row.get("start_date"), row.get("end_date"))
            .map_err(|e| postgres::Error::MalformedRow {
                table: Self::NAME,
                reason: e.to_string(),
            })
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        Ok(Self {
            id: row.get("id"),
            unit_id: row.get("unit_id"),
            tenant_id: row.get("tenant_id"),
            period,
            price: row.get("price"),
            deposit: row.get("deposit"),
            deposit_paid: row.get("deposit_paid"),
            status: row.get("status"),
            audit: live::audit_from_row(row),
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Box::new(self.id),
            Box::new(self.unit_id),
            Box::new(self.tenant_id),
            Box::new(self.period.start()),
            Box::new(self.period.end()),
            Box::new(self.price),
            Box::new(self.deposit),
            Box::new(self.deposit_paid),
            Box::new(self.status),
        ]
    }
}

impl_table!(Contract: contract::Id);

impl<C> Database<Select<By<Vec<Contract>, read::contract::Overlapping>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, read::contract::Overlapping>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::contract::Overlapping {
            unit_id,
            period,
            exclude,
        } = by.into_inner();
        let (start, end): (Date, Option<Date>) = (period.start(), period.end());

        // Open ends are treated as infinitely distant.
        let sql = Live::<Contract>::select()
            .filter("unit_id = $1::UUID")
            .filter("status <> $2::INT2")
            .filter("($3::UUID IS NULL OR id <> $3::UUID)")
            .filter("start_date <= COALESCE($5::DATE, 'infinity'::DATE)")
            .filter("$4::DATE <= COALESCE(end_date, 'infinity'::DATE)")
            .order_by("start_date, id")
            .sql();
        let rows = self
            .query(
                &sql,
                &[
                    &unit_id,
                    &contract::Status::Cancelled,
                    &exclude,
                    &start,
                    &end,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}

impl<C> Database<Select<By<Vec<Contract>, unit::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let unit_id = by.into_inner();

        let sql = Live::<Contract>::select()
            .filter("unit_id = $1::UUID")
            .order_by("start_date, id")
            .sql();
        let rows = self
            .query(&sql, &[&unit_id])
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}

impl<C> Database<Select<By<Vec<Contract>, tenant::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let tenant_id = by.into_inner();

        let sql = Live::<Contract>::select()
            .filter("tenant_id = $1::UUID")
            .order_by("start_date, id")
            .sql();
        let rows = self
            .query(&sql, &[&tenant_id])
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}

impl<C> Database<Select<By<Vec<Contract>, Option<premises::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, Option<premises::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let premises_id = by.into_inner();

        // Contracts of deleted `Unit`s are skipped along with them.
        let sql = Live::<Contract>::select()
            .filter(
                "unit_id IN (\
                    SELECT id FROM units \
                    WHERE deleted_at IS NULL \
                      AND ($1::UUID IS NULL OR premises_id = $1::UUID)\
                 )",
            )
            .order_by("start_date, id")
            .sql();
        let rows = self
            .query(&sql, &[&premises_id])
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}
