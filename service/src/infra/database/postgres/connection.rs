//! Raw Postgres connection definitions.

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, GenericClient, Row};
use tracerr::Traced;
use tracing as log;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Statement parameters.
pub type Params<'a> = &'a [&'a (dyn ToSql + Sync)];

/// Generic database connection statements are run on.
pub trait Connection {
    /// Runs the provided `sql` query returning all the resulting [`Row`]s.
    ///
    /// # Errors
    ///
    /// If failed to run the query.
    fn query(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>;

    /// Runs the provided `sql` query returning at most one [`Row`].
    ///
    /// # Errors
    ///
    /// If failed to run the query, or it returned more than one [`Row`].
    fn query_opt(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>;

    /// Runs the provided `sql` statement returning the number of affected
    /// rows.
    ///
    /// # Errors
    ///
    /// If failed to run the statement.
    fn exec(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>;
}

/// Transaction opened on a pooled [`NonTx`] connection.
#[self_referencing]
pub struct Tx {
    /// Pooled connection owning the transaction.
    conn: NonTx,

    /// Transaction itself, taken on commit.
    #[borrows(mut conn)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("finished", &self.with_tx(|tx| tx.is_none()))
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Opens a new [`Tx`] on the provided pooled connection.
    ///
    /// # Errors
    ///
    /// If failed to issue `BEGIN`.
    pub async fn begin(conn: NonTx) -> Result<Self, Traced<database::Error>> {
        log::trace!("BEGIN");
        Self::try_new_async_send(conn, |c| c.transaction().map_ok(Some).boxed())
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Returns the still open transaction of this [`Tx`].
    #[expect(
        clippy::redundant_closure_for_method_calls,
        reason = "different variance, see \
                  https://doc.rust-lang.org/nomicon/subtyping.html#variance"
    )]
    fn tx(
        &self,
    ) -> Result<&deadpool_postgres::Transaction<'_>, Traced<database::Error>>
    {
        self.with_tx(|tx| tx.as_ref())
            .ok_or_else(|| tracerr::new!(postgres::Error::TxFinished))
            .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`].
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is committed already, or `COMMIT` fails.
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        log::trace!("COMMIT");
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        let tx = self
            .with_tx_mut(|tx| tx.take())
            .ok_or_else(|| tracerr::new!(postgres::Error::TxFinished))
            .map_err(tracerr::map_from)?;
        tx.commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let client: &tokio_postgres::Client = self;
        query(client, sql, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        let client: &tokio_postgres::Client = self;
        query_opt(client, sql, params).await.map_err(tracerr::wrap!())
    }

    async fn exec(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        let client: &tokio_postgres::Client = self;
        exec(client, sql, params).await.map_err(tracerr::wrap!())
    }
}

impl Connection for Tx {
    async fn query(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let tx: &tokio_postgres::Transaction<'_> =
            self.tx().map_err(tracerr::wrap!())?;
        query(tx, sql, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        let tx: &tokio_postgres::Transaction<'_> =
            self.tx().map_err(tracerr::wrap!())?;
        query_opt(tx, sql, params).await.map_err(tracerr::wrap!())
    }

    async fn exec(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        let tx: &tokio_postgres::Transaction<'_> =
            self.tx().map_err(tracerr::wrap!())?;
        exec(tx, sql, params).await.map_err(tracerr::wrap!())
    }
}

/// Runs the provided `sql` query on the given `client`.
async fn query<C: GenericClient + Sync>(
    client: &C,
    sql: &str,
    params: Params<'_>,
) -> Result<Vec<Row>, Traced<database::Error>> {
    log::trace!(sql, "query");
    client
        .query(sql, params)
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Runs the provided `sql` query on the given `client`, expecting at most one
/// row.
async fn query_opt<C: GenericClient + Sync>(
    client: &C,
    sql: &str,
    params: Params<'_>,
) -> Result<Option<Row>, Traced<database::Error>> {
    log::trace!(sql, "query_opt");
    client
        .query_opt(sql, params)
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Runs the provided `sql` statement on the given `client`.
async fn exec<C: GenericClient + Sync>(
    client: &C,
    sql: &str,
    params: Params<'_>,
) -> Result<u64, Traced<database::Error>> {
    log::trace!(sql, "exec");
    client
        .execute(sql, params)
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}
