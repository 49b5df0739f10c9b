//! Assist request and active-assist records.

use rmfs_core::{MateId, SimTime, StationId, WaypointId};

/// One robot's pending need for assistance at an upcoming pick location.
///
/// At most one request exists per station; a robot registers its next
/// assist point and the record is retired when that assist completes.
#[derive(Clone, Debug)]
pub struct AssistRequest {
    pub station: StationId,

    /// The rendezvous waypoint.
    pub location: WaypointId,

    /// The robot's latest predicted arrival there.  Revised on every path
    /// change via `update_arrival_time`.
    pub robot_eta: SimTime,

    /// Mate currently assigned to cover this request, if any.
    pub covered_by: Option<MateId>,

    /// Cover changes since the first assignment.  Bounded by
    /// `max_mate_switches`; resets when the assist starts.
    pub switches: u32,

    /// `true` once robot and mate have met and the pick is underway.
    pub started: bool,
}

/// An assist in progress: both parties are at the location until `ends`.
#[derive(Clone, Debug)]
pub struct ActiveAssist {
    pub station: StationId,
    pub mate: MateId,
    pub location: WaypointId,
    pub ends: SimTime,
}

/// Scheduler outcomes the controller reacts to (order-line bookkeeping,
/// observer notification).
#[derive(Clone, Debug, PartialEq)]
pub enum AssistEvent {
    Started {
        station: StationId,
        mate: MateId,
        location: WaypointId,
        ends: SimTime,
    },
    Ended {
        station: StationId,
        mate: MateId,
        location: WaypointId,
    },
}
