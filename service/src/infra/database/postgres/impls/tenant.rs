//! [`Tenant`]-related [`Database`] implementations.

use common::operations::{By, Lock, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{tenant, Tenant},
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
    read,
};

use super::impl_table;

impl Table for Tenant {
    const NAME: &'static str = "tenants";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "document", "email", "phone"];

    fn from_row(row: &Row) -> Result<Self, Traced<database::Error>> {
        Ok(Self {
            id: row.get("id"),
            name: row.get("name"),
            document: row.get("document"),
            email: row.get("email"),
            phone: row.get("phone"),
            audit: live::audit_from_row(row),
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Box::new(self.id),
            Box::new(self.name.clone()),
            Box::new(self.document.clone()),
            Box::new(self.email.clone()),
            Box::new(self.phone.clone()),
        ]
    }
}

impl_table!(Tenant: tenant::Id);

impl Database<Lock<By<Tenant, tenant::Id>>> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Tenant, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // Serializes new bookings of the `Tenant` with its deletion.
        const SQL: &str = "\
            SELECT id \
            FROM tenants \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::tenant::TotalCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::tenant::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::tenant::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = Live::<Tenant>::select().count();
        let count = self
            .query_opt(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| row.get::<_, i64>("count"));
        Ok(u64::try_from(count).unwrap_or_default().into())
    }
}
