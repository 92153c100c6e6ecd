//! [`Command`] for creating a new [`Unit`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Area, Clock, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{premises, unit, user, Audit, Premises, Unit},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Unit`] in existing [`Premises`].
#[derive(Clone, Debug)]
pub struct CreateUnit {
    /// ID of the user creating the [`Unit`].
    pub initiator_id: user::Id,

    /// ID of the [`Premises`] housing the new [`Unit`].
    pub premises_id: premises::Id,

    /// [`unit::Code`] of the new [`Unit`].
    pub code: unit::Code,

    /// Monthly rent price of the new [`Unit`].
    pub price: Money,

    /// Floor [`Area`] of the new [`Unit`].
    pub area: Area,
}

impl<Db, Clk> Command<CreateUnit> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Premises>, premises::Id>>,
            Ok = Option<Premises>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Premises, premises::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Unit>, (premises::Id, unit::Code)>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<Insert<Unit>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Unit;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUnit) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUnit {
            initiator_id,
            premises_id,
            code,
            price,
            area,
        } = cmd;

        let premises = self
            .database()
            .execute(Select(By::<Option<Premises>, _>::new(premises_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PremisesNotExists(premises_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent creation of `Unit`s with the same `unit::Code`.
        tx.execute(Lock(By::<Premises, _>::new(premises.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let taken = tx
            .execute(Select(By::<Option<Unit>, _>::new((
                premises.id,
                code.clone(),
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if taken.is_some() {
            log::debug!(
                "`CreateUnit` rejected: `{code}` is taken in \
                 `Premises(id: {premises_id})`",
            );
            return Err(tracerr::new!(E::CodeTaken(code)));
        }

        let unit = Unit {
            id: unit::Id::new(),
            premises_id: premises.id,
            code,
            price,
            area,
            state: unit::State::Available,
            audit: Audit::new(self.clock().now(), Some(initiator_id)),
        };

        tx.execute(Insert(unit.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Unit(id: {})` created in `Premises(id: {premises_id})`",
            unit.id,
        );
        Ok(unit)
    }
}

/// Error of [`CreateUnit`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`unit::Code`] is used by another [`Unit`] of the same [`Premises`].
    #[display("`Unit` with code `{_0}` already exists")]
    CodeTaken(#[error(not(source))] unit::Code),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Premises`] with the provided ID does not exist.
    #[display("`Premises(id: {_0})` does not exist")]
    PremisesNotExists(#[error(not(source))] premises::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::CodeTaken(_) => Kind::InvalidValue,
            Self::Db(e) => e.kind(),
            Self::PremisesNotExists(_) => Kind::NotFound,
        }
    }
}
