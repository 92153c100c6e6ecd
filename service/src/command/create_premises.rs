//! [`Command`] for creating new [`Premises`].

use common::{
    operations::Insert,
    Clock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{premises, user, Audit, Premises},
    error::{Categorize, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating new [`Premises`].
#[derive(Clone, Debug)]
pub struct CreatePremises {
    /// ID of the user creating the [`Premises`].
    pub initiator_id: user::Id,

    /// [`premises::Name`] of the new [`Premises`].
    pub name: premises::Name,

    /// [`premises::Address`] of the new [`Premises`], if any.
    pub address: Option<premises::Address>,
}

impl<Db, Clk> Command<CreatePremises> for Service<Db, Clk>
where
    Clk: Clock,
    Db: Database<Insert<Premises>, Err = Traced<database::Error>>,
{
    type Ok = Premises;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePremises,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePremises {
            initiator_id,
            name,
            address,
        } = cmd;

        let premises = Premises {
            id: premises::Id::new(),
            name,
            address,
            audit: Audit::new(self.clock().now(), Some(initiator_id)),
        };

        self.database()
            .execute(Insert(premises.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Premises(id: {})` created", premises.id);
        Ok(premises)
    }
}

/// Error of [`CreatePremises`] [`Command`] execution.
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
