//! [`Contract`] read model definitions.

use crate::domain::{
    contract::{self, Period},
    unit,
};
#[cfg(doc)]
use crate::domain::{Contract, Unit};

/// Selector of [`Contract`]s of a [`Unit`] colliding with a [`Period`].
///
/// Only non-cancelled and non-deleted [`Contract`]s are considered, ordered
/// by their start ascending.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Overlapping {
    /// ID of the [`Unit`] to check.
    pub unit_id: unit::Id,

    /// [`Period`] to check.
    pub period: Period,

    /// ID of the [`Contract`] to ignore (the one being modified), if any.
    pub exclude: Option<contract::Id>,
}
