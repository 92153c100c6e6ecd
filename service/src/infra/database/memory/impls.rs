//! [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Update,
};
use tracerr::Traced;

use crate::{
    domain::{
        contract, expense, income, loan, premises, tenant, unit,
        Audited as _, Contract, Expense, Income, Loan, Premises, Tenant, Unit,
    },
    infra::{database, Database},
    read::{self, IncludingDeleted},
};

use super::{Connection, LockKey, Memory, NonTx, Record, Tables, Tx};

/// Implements [`Record`] and its basic [`Database`] operations for the
/// provided entities.
macro_rules! impl_record {
    ($($ty:ty => $table:ident: $id:ty),* $(,)?) => {$(
        impl Record for $ty {
            type Id = $id;

            fn id(&self) -> Self::Id {
                self.id
            }

            fn table(tables: &Tables) -> &HashMap<Self::Id, Self> {
                &tables.$table
            }

            fn table_mut(tables: &mut Tables) -> &mut HashMap<Self::Id, Self> {
                &mut tables.$table
            }
        }

        impl<C: Connection> Database<Select<By<Option<$ty>, $id>>>
            for Memory<C>
        {
            type Ok = Option<$ty>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$ty>, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self
                    .read(|t| {
                        t.$table.get(&id).filter(|r| !r.is_deleted()).cloned()
                    })
                    .await)
            }
        }

        impl<C: Connection>
            Database<Select<By<Option<$ty>, IncludingDeleted<$id>>>>
            for Memory<C>
        {
            type Ok = Option<$ty>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$ty>, IncludingDeleted<$id>>>,
            ) -> Result<Self::Ok, Self::Err> {
                let IncludingDeleted(id) = by.into_inner();
                Ok(self.read(|t| t.$table.get(&id).cloned()).await)
            }
        }

        impl<C: Connection> Database<Insert<$ty>> for Memory<C> {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Insert(row): Insert<$ty>,
            ) -> Result<Self::Ok, Self::Err> {
                self.write(|t| upsert(t, row)).await;
                Ok(())
            }
        }

        impl<C: Connection> Database<Update<$ty>> for Memory<C> {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Update(row): Update<$ty>,
            ) -> Result<Self::Ok, Self::Err> {
                self.write(|t| upsert(t, row)).await;
                Ok(())
            }
        }
    )*};
}

impl_record! {
    Premises => premises: premises::Id,
    Unit => units: unit::Id,
    Tenant => tenants: tenant::Id,
    Contract => contracts: contract::Id,
    Income => incomes: income::Id,
    Expense => expenses: expense::Id,
    Loan => loans: loan::Id,
}

/// Inserts or replaces the provided [`Record`] in the [`Tables`].
fn upsert<R: Record>(tables: &mut Tables, row: R) {
    drop(R::table_mut(tables).insert(row.id(), row));
}

/// Collects the provided live rows ordered by the provided key.
fn sorted<'a, R, K, I>(rows: I, key: impl Fn(&R) -> K) -> Vec<R>
where
    R: Record + 'a,
    K: Ord,
    I: Iterator<Item = &'a R>,
{
    let mut rows = rows.cloned().collect::<Vec<_>>();
    rows.sort_by_key(key);
    rows
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::from_non_tx(&self.0)))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await;
        Ok(())
    }
}

impl Database<Lock<By<Unit, unit::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Unit, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.lock(LockKey::Unit(by.into_inner())).await;
        Ok(())
    }
}

impl Database<Lock<By<Premises, premises::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Premises, premises::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.lock(LockKey::Premises(by.into_inner())).await;
        Ok(())
    }
}

impl Database<Lock<By<Tenant, tenant::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Tenant, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.lock(LockKey::Tenant(by.into_inner())).await;
        Ok(())
    }
}

impl<C: Connection>
    Database<Select<By<Vec<Contract>, read::contract::Overlapping>>>
    for Memory<C>
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

        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Contract>().filter(|c| {
                        c.unit_id == unit_id
                            && !c.is_cancelled()
                            && Some(c.id) != exclude
                            && c.period.overlaps(&period)
                    }),
                    |c| (c.period.start(), c.id),
                )
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Contract>, unit::Id>>>
    for Memory<C>
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let unit_id = by.into_inner();
        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Contract>().filter(|c| c.unit_id == unit_id),
                    |c| (c.period.start(), c.id),
                )
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Contract>, tenant::Id>>>
    for Memory<C>
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let tenant_id = by.into_inner();
        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Contract>().filter(|c| c.tenant_id == tenant_id),
                    |c| (c.period.start(), c.id),
                )
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Contract>, Option<premises::Id>>>>
    for Memory<C>
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, Option<premises::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let premises_id = by.into_inner();
        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Contract>().filter(|c| {
                        t.units.get(&c.unit_id).is_some_and(|u| {
                            !u.is_deleted()
                                && premises_id
                                    .map_or(true, |id| u.premises_id == id)
                        })
                    }),
                    |c| (c.period.start(), c.id),
                )
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Unit>, Option<premises::Id>>>>
    for Memory<C>
{
    type Ok = Vec<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unit>, Option<premises::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let premises_id = by.into_inner();
        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Unit>().filter(|u| {
                        premises_id.map_or(true, |id| u.premises_id == id)
                    }),
                    |u| (u.premises_id, u.code.to_string()),
                )
            })
            .await)
    }
}

impl<C: Connection>
    Database<Select<By<Option<Unit>, (premises::Id, unit::Code)>>>
    for Memory<C>
{
    type Ok = Option<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Unit>, (premises::Id, unit::Code)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (premises_id, code) = by.into_inner();
        Ok(self
            .read(|t| {
                t.live::<Unit>()
                    .find(|u| u.premises_id == premises_id && u.code == code)
                    .cloned()
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Income>, read::Window>>>
    for Memory<C>
{
    type Ok = Vec<Income>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Income>, read::Window>>,
    ) -> Result<Self::Ok, Self::Err> {
        let window = by.into_inner();
        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Income>().filter(|i| window.contains(i.paid_on)),
                    |i| (i.paid_on, i.id),
                )
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Expense>, read::Window>>>
    for Memory<C>
{
    type Ok = Vec<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Expense>, read::Window>>,
    ) -> Result<Self::Ok, Self::Err> {
        let window = by.into_inner();
        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Expense>().filter(|e| window.contains(e.spent_on)),
                    |e| (e.spent_on, e.id),
                )
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Expense>, loan::Id>>>
    for Memory<C>
{
    type Ok = Vec<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Expense>, loan::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let loan_id = by.into_inner();
        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Expense>().filter(|e| e.loan_id == Some(loan_id)),
                    |e| (e.spent_on, e.id),
                )
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Loan>, Option<premises::Id>>>>
    for Memory<C>
{
    type Ok = Vec<Loan>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Loan>, Option<premises::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let premises_id = by.into_inner();
        Ok(self
            .read(|t| {
                sorted(
                    t.live::<Loan>().filter(|l| {
                        premises_id.map_or(true, |id| l.premises_id == id)
                    }),
                    |l| (l.granted_on, l.id),
                )
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Premises>, ()>>> for Memory<C> {
    type Ok = Vec<Premises>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Premises>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .read(|t| {
                sorted(t.live::<Premises>(), |p| (p.name.to_string(), p.id))
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<read::tenant::TotalCount, ()>>>
    for Memory<C>
{
    type Ok = read::tenant::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::tenant::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .read(|t| {
                let count = t.live::<Tenant>().count();
                u64::try_from(count).unwrap_or(u64::MAX).into()
            })
            .await)
    }
}
