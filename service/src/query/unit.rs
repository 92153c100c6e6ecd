//! [`Query`] collection related to [`Unit`] occupancy.

use common::{
    operations::{By, Select},
    Clock,
};
use tracerr::Traced;

use crate::{
    domain::{premises, Contract, Unit},
    infra::{database, Database},
    read::unit::Occupancy,
    Service,
};
#[cfg(doc)]
use crate::domain::Premises;

use super::Query;

/// [`Query`] for the number of [`Unit`]s having a [`Contract`] active today,
/// excluding [`Unit`]s under maintenance.
///
/// Counts [`Unit`]s of all [`Premises`] if no [`premises::Id`] is provided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OccupiedCount(pub Option<premises::Id>);

/// [`Query`] for the number of [`Unit`]s having a [`Contract`] which hasn't
/// started yet.
///
/// Counts [`Unit`]s of all [`Premises`] if no [`premises::Id`] is provided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReservedCount(pub Option<premises::Id>);

/// [`Query`] for the today's [`Occupancy`] of [`Unit`]s.
///
/// Covers [`Unit`]s of all [`Premises`] if no [`premises::Id`] is provided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Snapshot(pub Option<premises::Id>);

impl<Db, Clk> Query<Snapshot> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Vec<Unit>, Option<premises::Id>>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Contract>, Option<premises::Id>>>,
            Ok = Vec<Contract>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Occupancy;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Snapshot(premises_id): Snapshot,
    ) -> Result<Self::Ok, Self::Err> {
        let units = self
            .database()
            .execute(Select(By::<Vec<Unit>, _>::new(premises_id)))
            .await
            .map_err(tracerr::wrap!())?;
        let contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(premises_id)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Occupancy::compute(&units, &contracts, self.clock().today()))
    }
}

impl<Db, Clk> Query<OccupiedCount> for Service<Db, Clk>
where
    Self: Query<Snapshot, Ok = Occupancy, Err = Traced<database::Error>>,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        OccupiedCount(premises_id): OccupiedCount,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Snapshot(premises_id))
            .await
            .map(|o| o.occupied)
            .map_err(tracerr::wrap!())
    }
}

impl<Db, Clk> Query<ReservedCount> for Service<Db, Clk>
where
    Self: Query<Snapshot, Ok = Occupancy, Err = Traced<database::Error>>,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ReservedCount(premises_id): ReservedCount,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Snapshot(premises_id))
            .await
            .map(|o| o.reserved)
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CancelContract,
        fixture::{actor, book, premises, service, tenant, unit},
        Command as _, Query as _,
    };

    use super::{OccupiedCount, ReservedCount};

    #[tokio::test]
    async fn counts_occupied_and_reserved_per_premises() {
        let (svc, _) = service("2024-03-15");
        let north = premises(&svc, "North").await;
        let south = premises(&svc, "South").await;
        let n1 = unit(&svc, north.id, "N-1").await;
        let n2 = unit(&svc, north.id, "N-2").await;
        let s1 = unit(&svc, south.id, "S-1").await;
        let t = tenant(&svc, "John Doe").await;

        _ = book(&svc, n1.id, t.id, "2024-01-01", None).await.unwrap();
        _ = book(&svc, n2.id, t.id, "2024-04-01", None).await.unwrap();
        let running = book(&svc, s1.id, t.id, "2024-03-01", Some("2024-03-31"))
            .await
            .unwrap();

        assert_eq!(svc.execute(OccupiedCount(None)).await.unwrap(), 2);
        assert_eq!(
            svc.execute(OccupiedCount(Some(north.id))).await.unwrap(),
            1,
        );
        assert_eq!(svc.execute(ReservedCount(None)).await.unwrap(), 1);
        assert_eq!(
            svc.execute(ReservedCount(Some(south.id))).await.unwrap(),
            0,
        );

        _ = svc
            .execute(CancelContract {
                contract_id: running.id,
                initiator_id: actor(),
            })
            .await
            .unwrap();

        assert_eq!(svc.execute(OccupiedCount(None)).await.unwrap(), 1);
    }
}
