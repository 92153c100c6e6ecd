//! Postgres database clients, checking out pooled connections lazily.

use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock, RwLockReadGuard};
use tokio_postgres::Row;
use tracerr::Traced;
use tracing as log;

use crate::infra::database::{
    self,
    postgres::{
        self,
        connection::{self, Params},
        Connection,
    },
};

/// Non-transactional Postgres database client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to check connections out from.
    pub(crate) pool: connection::Pool,

    /// Connection checked out on the first statement.
    conn: Arc<OnceCell<connection::NonTx>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            conn: Arc::default(),
        }
    }

    /// Checks out a new connection from the [`connection::Pool`].
    async fn checkout(
        pool: &connection::Pool,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        pool.get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Returns the connection of this [`NonTx`] client, checking it out if
    /// needed.
    async fn conn(
        &self,
    ) -> Result<&connection::NonTx, Traced<database::Error>> {
        self.conn
            .get_or_try_init(|| Self::checkout(&self.pool))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Connection for NonTx {
    async fn query(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let conn = self.conn().await.map_err(tracerr::wrap!())?;
        conn.query(sql, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        let conn = self.conn().await.map_err(tracerr::wrap!())?;
        conn.query_opt(sql, params).await.map_err(tracerr::wrap!())
    }

    async fn exec(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        let conn = self.conn().await.map_err(tracerr::wrap!())?;
        conn.exec(sql, params).await.map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// Transaction is opened on the first statement, so a [`Tx`] committed
/// without issuing any statements never touches the database.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to check the connection out from.
    pool: connection::Pool,

    /// State of the transaction, shared between clones.
    state: Arc<RwLock<State>>,
}

/// State of a [`Tx`] client.
#[derive(Debug, Default)]
enum State {
    /// Nothing was issued yet.
    #[default]
    Idle,

    /// Transaction is open.
    Open(connection::Tx),

    /// Transaction is committed.
    Finished,
}

impl State {
    /// Returns the open [`connection::Tx`], if any.
    const fn open(&self) -> Option<&connection::Tx> {
        match self {
            Self::Open(tx) => Some(tx),
            Self::Idle | Self::Finished => None,
        }
    }
}

impl Tx {
    /// Creates a new [`Tx`] client sharing the [`connection::Pool`] of the
    /// provided [`NonTx`] one.
    #[must_use]
    pub fn from_non_tx(client: &NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            state: Arc::default(),
        }
    }

    /// Returns the open transaction of this [`Tx`] client, opening it if
    /// needed.
    async fn tx(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        if let Ok(tx) =
            RwLockReadGuard::try_map(self.state.read().await, State::open)
        {
            return Ok(tx);
        }

        let mut state = self.state.write().await;
        if matches!(*state, State::Idle) {
            let conn = NonTx::checkout(&self.pool)
                .await
                .map_err(tracerr::wrap!())?;
            *state = State::Open(
                connection::Tx::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        RwLockReadGuard::try_map(state.downgrade(), State::open)
            .map_err(|_| tracerr::new!(postgres::Error::TxFinished))
            .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] client is committed already, or `COMMIT` fails.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let state =
            std::mem::replace(&mut *self.state.write().await, State::Finished);
        match state {
            State::Open(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            State::Idle => {
                log::trace!("nothing to commit");
                Ok(())
            }
            State::Finished => Err(tracerr::new!(postgres::Error::TxFinished))
                .map_err(tracerr::map_from),
        }
    }
}

impl Connection for Tx {
    async fn query(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let tx = self.tx().await.map_err(tracerr::wrap!())?;
        tx.query(sql, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        let tx = self.tx().await.map_err(tracerr::wrap!())?;
        tx.query_opt(sql, params).await.map_err(tracerr::wrap!())
    }

    async fn exec(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        let tx = self.tx().await.map_err(tracerr::wrap!())?;
        tx.exec(sql, params).await.map_err(tracerr::wrap!())
    }
}
