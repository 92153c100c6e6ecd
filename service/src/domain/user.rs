//! User definitions.
//!
//! Users are managed outside of this service, only their IDs are recorded as
//! actors of mutations.

#[cfg(doc)]
use super::Audit;
use super::define_id;

define_id! {
    /// ID of a user performing a mutation (see [`Audit`]).
    Id
}
