//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod error;
#[cfg(test)]
mod fixture;
pub mod infra;
pub mod query;
pub mod read;

use common::clock::SystemClock;
use smart_default::SmartDefault;

#[cfg(doc)]
use infra::Database;

pub use self::{
    command::Command,
    error::{Categorize, Kind as ErrorKind},
    query::Query,
};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Number of days ahead a [`Contract`] end is considered upcoming.
    ///
    /// [`Contract`]: domain::Contract
    #[default(30)]
    pub expiring_within_days: u16,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Clk = SystemClock> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Clock`] of this [`Service`].
    ///
    /// [`Clock`]: common::Clock
    clock: Clk,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters, reading the
    /// system time.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self {
            config,
            database,
            clock: SystemClock,
        }
    }
}

impl<Db, Clk> Service<Db, Clk> {
    /// Replaces the [`Clock`] of this [`Service`].
    ///
    /// [`Clock`]: common::Clock
    #[must_use]
    pub fn with_clock<C>(self, clock: C) -> Service<Db, C> {
        Service {
            config: self.config,
            database: self.database,
            clock,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Clock`] of this [`Service`].
    ///
    /// [`Clock`]: common::Clock
    #[must_use]
    pub fn clock(&self) -> &Clk {
        &self.clock
    }
}
