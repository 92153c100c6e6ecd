//! Error categorization.

use derive_more::Display;
use tracerr::Traced;

use crate::infra::database;

/// Category of a failed [`Command`] or [`Query`].
///
/// [`Command`]: crate::Command
/// [`Query`]: crate::Query
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Referenced entity doesn't exist or is deleted.
    #[display("NOT_FOUND")]
    NotFound,

    /// Date range collides with existing contracts of the same unit.
    #[display("OVERLAP")]
    Overlap,

    /// Date range is malformed.
    #[display("INVALID_RANGE")]
    InvalidRange,

    /// Value violates a domain constraint.
    #[display("INVALID_VALUE")]
    InvalidValue,

    /// Entity is already in a terminal state.
    #[display("ALREADY_TERMINAL")]
    AlreadyTerminal,

    /// Storage or another infrastructure failure.
    #[display("INFRASTRUCTURE")]
    Infrastructure,
}

/// Error exposing its [`Kind`].
pub trait Categorize {
    /// Returns [`Kind`] of this error.
    fn kind(&self) -> Kind;
}

impl<E: Categorize> Categorize for Traced<E> {
    fn kind(&self) -> Kind {
        self.as_ref().kind()
    }
}

impl Categorize for database::Error {
    fn kind(&self) -> Kind {
        #[cfg(feature = "postgres")]
        {
            let Self::Postgres(e) = self;
            // Unique indexes back domain constraints (like `Unit` codes).
            if e.is_unique_violation(None) {
                return Kind::InvalidValue;
            }
        }
        Kind::Infrastructure
    }
}
