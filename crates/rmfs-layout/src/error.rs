use rmfs_core::{PodId, WaypointId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no path from {from} to {to}")]
    NoRoute { from: WaypointId, to: WaypointId },

    #[error("{0} is forbidden and cannot be a path target")]
    ForbiddenTarget(WaypointId),

    #[error("{waypoint} already holds {occupant}, cannot place {pod}")]
    WaypointOccupied {
        waypoint: WaypointId,
        occupant: PodId,
        pod:      PodId,
    },

    #[error("{0} is not a pod storage location")]
    NotStorage(WaypointId),

    #[error("waypoint {0} out of range")]
    UnknownWaypoint(WaypointId),
}

pub type LayoutResult<T> = Result<T, LayoutError>;
