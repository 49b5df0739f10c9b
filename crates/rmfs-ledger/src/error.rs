use rmfs_core::{ActorId, WaypointId, ZoneId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{waypoint} is already locked by {prior}; {holder} may not overwrite it")]
    AlreadyLocked {
        waypoint: WaypointId,
        holder:   ActorId,
        prior:    ActorId,
    },

    #[error("zone {0} is not registered")]
    UnknownZone(ZoneId),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
