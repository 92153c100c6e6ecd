//! [`Unit`] read model definitions.

use std::collections::HashSet;

use common::{Date, Percent};
use serde::Serialize;

use crate::domain::{contract, unit, Contract, Unit};

/// Occupancy snapshot of a set of [`Unit`]s on a specific [`Date`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Occupancy {
    /// Total number of [`Unit`]s.
    pub total: u64,

    /// Number of [`Unit`]s per their nominal [`unit::State`].
    pub by_state: StateCounts,

    /// Number of [`Unit`]s not under maintenance.
    pub rentable: u64,

    /// Number of rentable [`Unit`]s having an active [`Contract`].
    pub occupied: u64,

    /// Number of [`Unit`]s having a [`Contract`] which hasn't started yet.
    pub reserved: u64,
}

/// Number of [`Unit`]s per their nominal [`unit::State`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StateCounts {
    /// Number of [`unit::State::Available`] [`Unit`]s.
    pub available: u64,

    /// Number of [`unit::State::Occupied`] [`Unit`]s.
    pub occupied: u64,

    /// Number of [`unit::State::Maintenance`] [`Unit`]s.
    pub maintenance: u64,

    /// Number of [`unit::State::Reserved`] [`Unit`]s.
    pub reserved: u64,
}

impl Occupancy {
    /// Computes the [`Occupancy`] of the provided [`Unit`]s out of their
    /// [`Contract`]s on the provided [`Date`].
    ///
    /// [`Contract`]s of other [`Unit`]s are ignored.
    #[must_use]
    pub fn compute(units: &[Unit], contracts: &[Contract], on: Date) -> Self {
        let mut active = HashSet::new();
        let mut pending = HashSet::new();
        for c in contracts {
            match c.status_on(on) {
                contract::Status::Active => drop(active.insert(c.unit_id)),
                contract::Status::Pending => drop(pending.insert(c.unit_id)),
                contract::Status::Cancelled | contract::Status::Finished => {}
            }
        }

        let mut this = Self::default();
        for u in units {
            this.total += 1;
            match u.state {
                unit::State::Available => this.by_state.available += 1,
                unit::State::Occupied => this.by_state.occupied += 1,
                unit::State::Maintenance => this.by_state.maintenance += 1,
                unit::State::Reserved => this.by_state.reserved += 1,
            }
            if u.state != unit::State::Maintenance {
                this.rentable += 1;
                if active.contains(&u.id) {
                    this.occupied += 1;
                }
            }
            if pending.contains(&u.id) {
                this.reserved += 1;
            }
        }
        this
    }

    /// Returns the share of rentable [`Unit`]s being occupied.
    ///
    /// [`Percent::ZERO`] if there are no rentable [`Unit`]s.
    #[must_use]
    pub fn rate(&self) -> Percent {
        Percent::ratio(self.occupied, self.rentable)
    }
}
