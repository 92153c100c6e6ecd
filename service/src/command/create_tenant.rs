//! [`Command`] for creating a new [`Tenant`].

use common::{operations::Insert, Clock};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{tenant, user, Audit, Tenant},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Tenant`].
#[derive(Clone, Debug)]
pub struct CreateTenant {
    /// ID of the user creating the [`Tenant`].
    pub initiator_id: user::Id,

    /// [`tenant::Name`] of the new [`Tenant`].
    pub name: tenant::Name,

    /// [`tenant::Document`] of the new [`Tenant`], if any.
    pub document: Option<tenant::Document>,

    /// [`tenant::Email`] of the new [`Tenant`], if any.
    pub email: Option<tenant::Email>,

    /// [`tenant::Phone`] of the new [`Tenant`], if any.
    pub phone: Option<tenant::Phone>,
}

impl<Db, Clk> Command<CreateTenant> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<Insert<Tenant>, Err = Traced<database::Error>>,
{
    type Ok = Tenant;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateTenant,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateTenant {
            initiator_id,
            name,
            document,
            email,
            phone,
        } = cmd;

        let tenant = Tenant {
            id: tenant::Id::new(),
            name,
            document,
            email,
            phone,
            audit: Audit::new(self.clock().now(), Some(initiator_id)),
        };

        self.database()
            .execute(Insert(tenant.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Tenant(id: {})` created", tenant.id);
        Ok(tenant)
    }
}

/// Error of [`CreateTenant`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

impl Categorize for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
        }
    }
}
