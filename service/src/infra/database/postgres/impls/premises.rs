//! [`Premises`]-related [`Database`] implementations.

use common::operations::{By, Lock, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{premises, Premises},
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

impl Table for Premises {
    const NAME: &'static str = "premises";
    const COLUMNS: &'static [&'static str] = &["id", "name", "address"];

    fn from_row(row: &Row) -> Result<Self, Traced<database::Error>> {
        Ok(Self {
            id: row.get("id"),
            name: row.get("name"),
            address: row.get("address"),
            audit: live::audit_from_row(row),
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Box::new(self.id),
            Box::new(self.name.clone()),
            Box::new(self.address.clone()),
        ]
    }
}

impl_table!(Premises: premises::Id);

impl<C> Database<Select<By<Vec<Premises>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Premises>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Premises>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = Live::<Premises>::select().order_by("name, id").sql();
        let rows = self.query(&sql, &[]).await.map_err(tracerr::wrap!())?;
        live::decode(rows)
    }
}

impl Database<Lock<By<Premises, premises::Id>>> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Premises, premises::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM premises \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
