//! [`Command`] for soft-deleting a [`Tenant`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, tenant, user, Contract, Tenant},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for soft-deleting a [`Tenant`].
///
/// [`Tenant`] still bound by an active or pending [`Contract`] cannot be
/// deleted.
#[derive(Clone, Copy, Debug)]
pub struct DeleteTenant {
    /// ID of the [`Tenant`] to delete.
    pub tenant_id: tenant::Id,

    /// ID of the user deleting the [`Tenant`].
    pub initiator_id: user::Id,
}

impl<Db, Clk> Command<DeleteTenant> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Tenant, tenant::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Contract>, tenant::Id>>,
            Ok = Vec<Contract>,
            Err = Traced<database::Error>,
        > + Database<Update<Tenant>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Tenant;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteTenant,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteTenant {
            tenant_id,
            initiator_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Keep new `Contract`s off the `Tenant` until it's deleted.
        tx.execute(Lock(By::<Tenant, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut tenant = tx
            .execute(Select(By::<Option<Tenant>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())?;

        let today = self.clock().today();
        let binding = tx
            .execute(Select(By::<Vec<Contract>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|c| {
                matches!(
                    c.status_on(today),
                    contract::Status::Active | contract::Status::Pending,
                )
            })
            .map(|c| c.id)
            .collect::<Vec<_>>();
        if !binding.is_empty() {
            log::debug!(
                "`DeleteTenant` rejected: `Tenant(id: {tenant_id})` has {} \
                 current `Contract`s",
                binding.len(),
            );
            return Err(tracerr::new!(E::TenantHasContracts(tenant_id)));
        }

        let now = self.clock().now();
        tenant.audit.touch(now, initiator_id);
        tenant.audit.soft_delete(now, initiator_id);

        tx.execute(Update(tenant.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Tenant(id: {tenant_id})` deleted");
        Ok(tenant)
    }
}

/// Error of [`DeleteTenant`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Tenant`] is still bound by active or pending [`Contract`]s.
    #[display("`Tenant(id: {_0})` has active or pending `Contract`s")]
    TenantHasContracts(#[error(not(source))] tenant::Id),

    /// [`Tenant`] with the provided ID does not exist.
    #[display("`Tenant(id: {_0})` does not exist")]
    TenantNotExists(#[error(not(source))] tenant::Id),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::TenantHasContracts(_) => Kind::InvalidValue,
            Self::TenantNotExists(_) => Kind::NotFound,
        }
    }
}
