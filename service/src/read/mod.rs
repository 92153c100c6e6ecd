//! Read entities definitions.

pub mod contract;
pub mod ledger;
pub mod loan;
pub mod tenant;
pub mod unit;

use common::{Date, YearMonth};

/// Selector of an entity by `T` which doesn't skip soft-deleted entities.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct IncludingDeleted<T>(pub T);

/// Inclusive window of [`Date`]s, unbounded on a side missing its bound.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Window {
    /// First [`Date`] of this [`Window`], if any.
    pub from: Option<Date>,

    /// Last [`Date`] of this [`Window`], if any.
    pub to: Option<Date>,
}

impl Window {
    /// Creates a new [`Window`] spanning the provided inclusive range.
    #[must_use]
    pub const fn between(from: Date, to: Date) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Creates a new [`Window`] spanning the whole provided [`YearMonth`].
    #[must_use]
    pub fn month(month: YearMonth) -> Self {
        Self::between(month.first_day(), month.last_day())
    }

    /// Checks whether this [`Window`] includes the provided [`Date`].
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.from.map_or(true, |from| from <= date)
            && self.to.map_or(true, |to| date <= to)
    }
}
