//! [`Command`] for restoring a soft-deleted [`Tenant`].

use common::{
    operations::{By, Select, Update},
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{tenant, user, Tenant},
    error::{Categorize, Kind},
    infra::{database, Database},
    read::IncludingDeleted,
    Service,
};

use super::Command;

/// [`Command`] for restoring a soft-deleted [`Tenant`].
///
/// Restoring a non-deleted [`Tenant`] is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct RestoreTenant {
    /// ID of the [`Tenant`] to restore.
    pub tenant_id: tenant::Id,

    /// ID of the user restoring the [`Tenant`].
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<RestoreTenant> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<
            Select<By<Option<Tenant>, IncludingDeleted<tenant::Id>>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<Update<Tenant>, Err = Traced<database::Error>>,
{
    type Ok = Tenant;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RestoreTenant,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RestoreTenant {
            tenant_id,
            initiator_id,
        } = cmd;

        let mut tenant = self
            .database()
            .execute(Select(By::<Option<Tenant>, _>::new(IncludingDeleted(
                tenant_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())?;
        if !tenant.audit.is_deleted() {
            return Ok(tenant);
        }

        tenant.audit.restore();
        tenant.audit.touch(self.clock().now(), initiator_id);

        self.database()
            .execute(Update(tenant.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(tenant)
    }
}

/// Error of [`RestoreTenant`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Tenant`] with the provided ID never existed.
    #[display("`Tenant(id: {_0})` does not exist")]
    TenantNotExists(#[error(not(source))] tenant::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::TenantNotExists(_) => Kind::NotFound,
        }
    }
}
