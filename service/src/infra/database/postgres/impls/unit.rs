//! [`Unit`]-related [`Database`] implementations.

use common::operations::{By, Lock, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{premises, unit, Unit},
    infra::{
        database::{
            self,
            postgres::{
                live::{self, Live, Param, Table},
                Connection, Tx,
            },
            Postgres,
        },
        Database,
    },
};

use super::impl_table;

impl Table for Unit {
    const NAME: &'static str = "units";
    const COLUMNS: &'static [&'static str] =
        &["id", "premises_id", "code", "price", "area", "state"];

    fn from_row(row: &Row) -> Result<Self, Traced<database::Error>> {
        Ok(Self {
            id: row.get("id"),
            premises_id: row.get("premises_id"),
            code: row.get("code"),
            price: row.get("price"),
            area: row.get("area"),
            state: row.get("state"),
            audit: live::audit_from_row(row),
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Box::new(self.id),
            Box::new(self.premises_id),
            Box::new(self.code.clone()),
            Box::new(self.price),
            Box::new(self.area),
            Box::new(self.state),
        ]
    }
}

impl_table!(Unit: unit::Id);

impl<C> Database<Select<By<Vec<Unit>, Option<premises::Id>>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unit>, Option<premises::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let premises_id = by.into_inner();

        let sql = Live::<Unit>::select()
            .filter("($1::UUID IS NULL OR premises_id = $1::UUID)")
            .order_by("premises_id, code")
            .sql();
        let rows = self
            .query(&sql, &[&premises_id])
            .await
            .map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}

impl<C> Database<Select<By<Option<Unit>, (premises::Id, unit::Code)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Unit>, (premises::Id, unit::Code)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (premises_id, code) = by.into_inner();

        let sql = Live::<Unit>::select()
            .filter("premises_id = $1::UUID")
            .filter("code = $2::VARCHAR")
            .sql();
        self.query_opt(&sql, &[&premises_id, &code])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Unit::from_row(&row))
            .transpose()
    }
}

impl Database<Lock<By<Unit, unit::Id>>> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Unit, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // Row lock serializes bookings of the same `Unit` till commit.
        const SQL: &str = "\
            SELECT id \
            FROM units \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
