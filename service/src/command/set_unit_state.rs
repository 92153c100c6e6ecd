//! [`Command`] for setting a nominal [`unit::State`] of a [`Unit`].

use common::{
    operations::{By, Select, Update},
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{unit, user, Unit},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for setting a nominal [`unit::State`] of a [`Unit`].
#[derive(Clone, Copy, Debug)]
pub struct SetUnitState {
    /// ID of the [`Unit`] to modify.
    pub unit_id: unit::Id,

    /// New [`unit::State`] of the [`Unit`].
    pub state: unit::State,

    /// ID of the user modifying the [`Unit`].
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<SetUnitState> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<Update<Unit>, Err = Traced<database::Error>>,
{
    type Ok = Unit;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SetUnitState,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetUnitState {
            unit_id,
            state,
            initiator_id,
        } = cmd;

        let mut unit = self
            .database()
            .execute(Select(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;
        if unit.state == state {
            return Ok(unit);
        }

        unit.state = state;
        unit.audit.touch(self.clock().now(), initiator_id);

        self.database()
            .execute(Update(unit.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(unit)
    }
}

/// Error of [`SetUnitState`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::UnitNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::unit::State,
        fixture::{self, actor, seed},
        query::unit::Snapshot,
        Command as _,
    };

    use super::SetUnitState;

    #[tokio::test]
    async fn maintenance_units_are_not_rentable() {
        let (svc, _) = fixture::service("2024-03-01");
        let (premises, unit, _) = seed(&svc).await;
        _ = fixture::unit(&svc, premises.id, "A-2").await;

        let updated = svc
            .execute(SetUnitState {
                unit_id: unit.id,
                state: State::Maintenance,
                initiator_id: actor(),
            })
            .await
            .unwrap();
        assert_eq!(updated.state, State::Maintenance);

        let occupancy = svc.execute(Snapshot(Some(premises.id))).await.unwrap();
        assert_eq!(occupancy.total, 2);
        assert_eq!(occupancy.by_state.maintenance, 1);
        assert_eq!(occupancy.rentable, 1);
    }
}
