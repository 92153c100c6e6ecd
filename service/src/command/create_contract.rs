//! [`Command`] for creating a new [`Contract`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Clock, Date, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract::{self, InvalidPeriod, Period},
        tenant, unit, user, Audit, Contract, Tenant, Unit,
    },
    error::{Categorize, Kind},
    infra::{database, Database},
    read,
    Service,
};

use super::{Command, Overlap};

/// [`Command`] for creating a new [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct CreateContract {
    /// ID of the user creating the [`Contract`].
    pub initiator_id: user::Id,

    /// ID of the [`Unit`] to rent.
    pub unit_id: unit::Id,

    /// ID of the [`Tenant`] renting the [`Unit`].
    pub tenant_id: tenant::Id,

    /// First day of the new [`Contract`].
    pub start: Date,

    /// Last day of the new [`Contract`], if it's not open-ended.
    pub end: Option<Date>,

    /// Monthly price of the new [`Contract`].
    pub price: Money,

    /// Deposit of the new [`Contract`], if any.
    pub deposit: Option<Money>,

    /// Indicator whether the deposit is paid already.
    pub deposit_paid: bool,
}

impl<Db, Clk> Command<CreateContract> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Unit, unit::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Tenant, tenant::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Contract>, read::contract::Overlapping>>,
            Ok = Vec<Contract>,
            Err = Traced<database::Error>,
        > + Database<Insert<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateContract {
            initiator_id,
            unit_id,
            tenant_id,
            start,
            end,
            price,
            deposit,
            deposit_paid,
        } = cmd;

        let period = Period::new(start, end)
            .map_err(E::InvalidRange)
            .map_err(tracerr::wrap!())?;

        let unit = self
            .database()
            .execute(Select(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `Unit`.
        tx.execute(Lock(By::<Unit, _>::new(unit.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Keep the `Tenant` from being deleted meanwhile.
        tx.execute(Lock(By::<Tenant, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let tenant = tx
            .execute(Select(By::<Option<Tenant>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())?;

        let conflicting = tx
            .execute(Select(By::<Vec<Contract>, _>::new(
                read::contract::Overlapping {
                    unit_id: unit.id,
                    period,
                    exclude: None,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(overlap) = Overlap::detect(unit.id, &conflicting) {
            log::debug!("`CreateContract` rejected: {overlap}");
            return Err(tracerr::new!(E::Overlap(overlap)));
        }

        let mut contract = Contract {
            id: contract::Id::new(),
            unit_id: unit.id,
            tenant_id: tenant.id,
            period,
            price,
            deposit,
            deposit_paid,
            status: contract::Status::Pending,
            audit: Audit::new(self.clock().now(), Some(initiator_id)),
        };
        contract.refresh_status(self.clock().today());

        tx.execute(Insert(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Contract(id: {})` created for `Unit(id: {})`",
            contract.id,
            contract.unit_id,
        );
        Ok(contract)
    }
}

/// Error of [`CreateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested [`Period`] is malformed.
    #[display("Invalid `Contract` dates: {_0}")]
    InvalidRange(InvalidPeriod),

    /// Requested [`Period`] collides with existing [`Contract`]s.
    #[display("{_0}")]
    Overlap(Overlap),

    /// [`Tenant`] with the provided ID does not exist.
    #[display("`Tenant(id: {_0})` does not exist")]
    TenantNotExists(#[error(not(source))] tenant::Id),

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::InvalidRange(_) => Kind::InvalidRange,
            Self::Overlap(_) => Kind::Overlap,
            Self::TenantNotExists(_) | Self::UnitNotExists(_) => Kind::NotFound,
        }
    }
}
