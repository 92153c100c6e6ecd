//! [`Database`] implementations.

#![allow(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]
#![allow(clippy::too_many_lines, reason = "SQL-related code a bit verbose")]

mod contract;
mod ledger;
mod premises;
mod tenant;
mod unit;

use async_trait::async_trait;
use common::operations::{Commit, Transact};
use refinery_core::{
    traits::r#async::{AsyncQuery, AsyncTransaction},
    AsyncMigrate, Migration,
};
use tracerr::Traced;

use crate::infra::{database, postgres, Database};

use super::{NonTx, Postgres, Tx};

/// Implements basic [`Database`] operations for the provided [`Table`]s:
/// selecting by ID (with and without soft-deleted rows), inserting and
/// upserting.
///
/// [`Table`]: super::live::Table
macro_rules! impl_table {
    ($($ty:ty: $id:ty),* $(,)?) => {$(
        impl<C> $crate::infra::Database<
            ::common::operations::Select<
                ::common::operations::By<Option<$ty>, $id>,
            >,
        > for $crate::infra::database::Postgres<C>
        where
            C: $crate::infra::database::postgres::Connection,
        {
            type Ok = Option<$ty>;
            type Err = ::tracerr::Traced<$crate::infra::database::Error>;

            async fn execute(
                &self,
                select: ::common::operations::Select<
                    ::common::operations::By<Option<$ty>, $id>,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                use $crate::infra::database::postgres::{
                    live::{Live, Table as _},
                    Connection as _,
                };

                let id = select.0.into_inner();
                let sql = Live::<$ty>::select().filter("id = $1::UUID").sql();
                self.query_opt(&sql, &[&id])
                    .await
                    .map_err(::tracerr::wrap!())?
                    .map(|row| <$ty>::from_row(&row))
                    .transpose()
            }
        }

        impl<C> $crate::infra::Database<
            ::common::operations::Select<
                ::common::operations::By<
                    Option<$ty>,
                    $crate::read::IncludingDeleted<$id>,
                >,
            >,
        > for $crate::infra::database::Postgres<C>
        where
            C: $crate::infra::database::postgres::Connection,
        {
            type Ok = Option<$ty>;
            type Err = ::tracerr::Traced<$crate::infra::database::Error>;

            async fn execute(
                &self,
                select: ::common::operations::Select<
                    ::common::operations::By<
                        Option<$ty>,
                        $crate::read::IncludingDeleted<$id>,
                    >,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                use $crate::infra::database::postgres::{
                    live::{Live, Table as _},
                    Connection as _,
                };

                let $crate::read::IncludingDeleted(id) = select.0.into_inner();
                let sql = Live::<$ty>::select()
                    .including_deleted()
                    .filter("id = $1::UUID")
                    .sql();
                self.query_opt(&sql, &[&id])
                    .await
                    .map_err(::tracerr::wrap!())?
                    .map(|row| <$ty>::from_row(&row))
                    .transpose()
            }
        }

        impl<C> $crate::infra::Database<::common::operations::Insert<$ty>>
            for $crate::infra::database::Postgres<C>
        where
            C: $crate::infra::database::postgres::Connection,
        {
            type Ok = ();
            type Err = ::tracerr::Traced<$crate::infra::database::Error>;

            async fn execute(
                &self,
                insert: ::common::operations::Insert<$ty>,
            ) -> Result<Self::Ok, Self::Err> {
                use ::tokio_postgres::types::ToSql;

                use $crate::infra::database::postgres::{
                    live::Table as _,
                    Connection as _,
                };

                let params = insert.0.row_params();
                let params = params
                    .iter()
                    .map(|p| &**p)
                    .collect::<Vec<&(dyn ToSql + Sync)>>();
                self.exec(&<$ty>::insert(), &params)
                    .await
                    .map_err(::tracerr::wrap!())
                    .map(drop)
            }
        }

        impl<C> $crate::infra::Database<::common::operations::Update<$ty>>
            for $crate::infra::database::Postgres<C>
        where
            C: $crate::infra::database::postgres::Connection,
        {
            type Ok = ();
            type Err = ::tracerr::Traced<$crate::infra::database::Error>;

            async fn execute(
                &self,
                update: ::common::operations::Update<$ty>,
            ) -> Result<Self::Ok, Self::Err> {
                use ::tokio_postgres::types::ToSql;

                use $crate::infra::database::postgres::{
                    live::Table as _,
                    Connection as _,
                };

                let params = update.0.row_params();
                let params = params
                    .iter()
                    .map(|p| &**p)
                    .collect::<Vec<&(dyn ToSql + Sync)>>();
                self.exec(&<$ty>::upsert(), &params)
                    .await
                    .map_err(::tracerr::wrap!())
                    .map(drop)
            }
        }
    )*};
}
use impl_table;

impl Database<Transact> for Postgres<NonTx> {
    type Ok = Postgres<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Postgres(Tx::from_non_tx(&self.0)))
    }
}

impl Database<Transact> for Postgres<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await.map_err(tracerr::wrap!())
    }
}

#[async_trait]
impl AsyncTransaction for Postgres {
    type Error = Traced<database::Error>;

    async fn execute(
        &mut self,
        queries: &[&str],
    ) -> Result<usize, Self::Error> {
        let mut conn = self
            .0
            .pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        AsyncTransaction::execute(&mut **conn, queries)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

#[async_trait]
impl AsyncQuery<Vec<Migration>> for Postgres {
    async fn query(
        &mut self,
        query: &str,
    ) -> Result<Vec<Migration>, <Self as AsyncTransaction>::Error> {
        let mut conn = self
            .0
            .pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        AsyncQuery::query(&mut **conn, query)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl AsyncMigrate for Postgres {}
