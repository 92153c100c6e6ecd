//! [`Tenant`] read model definitions.

use derive_more::{Display, From, Into};
use serde::Serialize;

#[cfg(doc)]
use crate::domain::Tenant;

/// Total count of non-deleted [`Tenant`]s.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct TotalCount(u64);
