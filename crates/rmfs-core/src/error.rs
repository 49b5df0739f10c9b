//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert them into
//! `FleetError` via `From` impls or wrap `FleetError` as one variant.  Both
//! patterns are acceptable; prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::{MateId, OrderId, StationId, WaypointId};

/// The top-level error type for `rmfs-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("station {0} not found")]
    StationNotFound(StationId),

    #[error("mate {0} not found")]
    MateNotFound(MateId),

    #[error("waypoint {0} not found")]
    WaypointNotFound(WaypointId),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `rmfs-*` crates.
pub type FleetResult<T> = Result<T, FleetError>;
