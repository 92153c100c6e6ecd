//! Reporting [`Query`] collection.
//!
//! [`Query`]: super::Query

pub mod chart;
pub mod dashboard;
pub mod profitability;

pub use self::{
    chart::Chart, dashboard::Dashboard, profitability::Profitability,
};
