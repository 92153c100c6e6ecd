//! In-memory [`Database`] implementation.
//!
//! Keeps the same semantics as [`Postgres`] one: reads skip soft-deleted
//! rows, transactions stage their writes until committed and hold the locks
//! they took until committed or dropped.
//!
//! [`Postgres`]: super::Postgres

mod impls;

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    mem,
    sync::Arc,
};

use derive_more::Deref;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::{
    contract, expense, income, loan, premises, tenant, unit, Audited,
    Contract, Expense, Income, Loan, Premises, Tenant, Unit,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shared state of a [`Memory`] database.
#[derive(Debug, Default)]
struct Store {
    /// Committed rows.
    tables: RwLock<Tables>,

    /// Row locks by their [`LockKey`].
    locks: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

impl Store {
    /// Forgets the row locks nobody holds or waits for.
    ///
    /// Does nothing while the locks are busy, as the next release retries.
    fn prune_locks(&self) {
        if let Ok(mut locks) = self.locks.try_lock() {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
    }
}

/// Key of a row lock.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum LockKey {
    /// Lock of [`Premises`].
    Premises(premises::Id),

    /// Lock of a [`Tenant`].
    Tenant(tenant::Id),

    /// Lock of a [`Unit`].
    Unit(unit::Id),
}

/// Rows of all the entities, including soft-deleted ones.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    /// [`Premises`] rows.
    premises: HashMap<premises::Id, Premises>,

    /// [`Unit`] rows.
    units: HashMap<unit::Id, Unit>,

    /// [`Tenant`] rows.
    tenants: HashMap<tenant::Id, Tenant>,

    /// [`Contract`] rows.
    contracts: HashMap<contract::Id, Contract>,

    /// [`Income`] rows.
    incomes: HashMap<income::Id, Income>,

    /// [`Expense`] rows.
    expenses: HashMap<expense::Id, Expense>,

    /// [`Loan`] rows.
    loans: HashMap<loan::Id, Loan>,
}

impl Tables {
    /// Returns a live (non-deleted) view of `R` rows.
    fn live<'a, R: Record + 'a>(&'a self) -> impl Iterator<Item = &'a R> + 'a
    where
        R::Id: 'a,
    {
        R::table(self).values().filter(|r| !r.is_deleted())
    }

    /// Overwrites these [`Tables`] with the rows of the `other` ones.
    fn merge(&mut self, other: Self) {
        let Self {
            premises,
            units,
            tenants,
            contracts,
            incomes,
            expenses,
            loans,
        } = other;
        self.premises.extend(premises);
        self.units.extend(units);
        self.tenants.extend(tenants);
        self.contracts.extend(contracts);
        self.incomes.extend(incomes);
        self.expenses.extend(expenses);
        self.loans.extend(loans);
    }
}

/// Entity stored in its own table of [`Tables`].
trait Record: Audited + Clone {
    /// Type of the ID of this [`Record`].
    type Id: Copy + Eq + Hash;

    /// Returns the ID of this [`Record`].
    fn id(&self) -> Self::Id;

    /// Returns the table of this [`Record`].
    fn table(tables: &Tables) -> &HashMap<Self::Id, Self>;

    /// Returns the mutable table of this [`Record`].
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Self::Id, Self>;
}

/// Generic [`Memory`] connection.
pub trait Connection {
    /// Runs the provided function over the rows visible to this
    /// [`Connection`].
    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> impl Future<Output = R>;

    /// Runs the provided function writing rows via this [`Connection`].
    fn write(&self, f: impl FnOnce(&mut Tables)) -> impl Future<Output = ()>;
}

/// Non-transactional [`Memory`] connection.
///
/// Writes are applied immediately.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// [`Store`] of the database.
    store: Arc<Store>,
}

impl Connection for NonTx {
    async fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        f(&*self.store.tables.read().await)
    }

    async fn write(&self, f: impl FnOnce(&mut Tables)) {
        f(&mut *self.store.tables.write().await);
    }
}

/// Transactional [`Memory`] connection.
///
/// Writes are staged until [`Tx::commit()`], dropping all the clones of a
/// [`Tx`] discards them and releases the taken locks.
#[derive(Clone, Debug)]
pub struct Tx {
    /// State of this transaction.
    inner: Arc<TxInner>,
}

/// State of a [`Tx`].
#[derive(Debug)]
struct TxInner {
    /// [`Store`] of the database.
    store: Arc<Store>,

    /// Rows written, but not committed yet.
    staged: Mutex<Tables>,

    /// Locks held by this transaction.
    guards: Mutex<HashMap<LockKey, OwnedMutexGuard<()>>>,
}

impl Tx {
    /// Starts a new [`Tx`] over the [`Store`] of the provided [`NonTx`].
    fn from_non_tx(client: &NonTx) -> Self {
        Self {
            inner: Arc::new(TxInner {
                store: Arc::clone(&client.store),
                staged: Mutex::default(),
                guards: Mutex::default(),
            }),
        }
    }

    /// Waits for the lock of the provided [`LockKey`] and holds it until this
    /// [`Tx`] ends.
    async fn lock(&self, key: LockKey) {
        if self.inner.guards.lock().await.contains_key(&key) {
            return;
        }

        let mutex = Arc::clone(
            self.inner.store.locks.lock().await.entry(key).or_default(),
        );
        let guard = mutex.lock_owned().await;
        drop(self.inner.guards.lock().await.insert(key, guard));
    }

    /// Applies the staged writes and releases the locks of this [`Tx`].
    async fn commit(&self) {
        let staged = mem::take(&mut *self.inner.staged.lock().await);
        self.inner.store.tables.write().await.merge(staged);
        self.inner.guards.lock().await.clear();
        self.inner.store.prune_locks();
    }
}

impl Drop for TxInner {
    fn drop(&mut self) {
        self.guards.get_mut().clear();
        self.store.prune_locks();
    }
}

impl Connection for Tx {
    async fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let mut tables = self.inner.store.tables.read().await.clone();
        tables.merge(self.inner.staged.lock().await.clone());
        f(&tables)
    }

    async fn write(&self, f: impl FnOnce(&mut Tables)) {
        f(&mut *self.inner.staged.lock().await);
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{tenant, unit};

    use super::{LockKey, Memory, Tx};

    #[tokio::test]
    async fn forgets_released_locks() {
        let db = Memory::new();
        let held = |db: &Memory| {
            let locks = db.0.store.locks.try_lock().unwrap();
            locks.len()
        };

        let tx = Tx::from_non_tx(&db.0);
        tx.lock(LockKey::Unit(unit::Id::new())).await;
        tx.lock(LockKey::Tenant(tenant::Id::new())).await;
        assert_eq!(held(&db), 2);
        tx.commit().await;
        assert_eq!(held(&db), 0);

        let tx = Tx::from_non_tx(&db.0);
        tx.lock(LockKey::Unit(unit::Id::new())).await;
        assert_eq!(held(&db), 1);
        drop(tx);
        assert_eq!(held(&db), 0);
    }

    #[tokio::test]
    async fn keeps_contended_locks() {
        let db = Memory::new();
        let key = LockKey::Unit(unit::Id::new());

        let first = Tx::from_non_tx(&db.0);
        first.lock(key).await;
        let second = Tx::from_non_tx(&db.0);
        let waiting = second.lock(key);
        tokio::pin!(waiting);
        assert!(futures::poll!(&mut waiting).is_pending());

        first.commit().await;
        assert_eq!(db.0.store.locks.try_lock().unwrap().len(), 1);

        waiting.await;
        second.commit().await;
        assert!(db.0.store.locks.try_lock().unwrap().is_empty());
    }
}
