//! Composite tasks.

use rmfs_core::{OrderId, PodId, StationId, WaypointId};

// ── GatherTask ────────────────────────────────────────────────────────────────

/// One stop of a gather plan: where to go, what sits there, how long the
/// pick takes.
#[derive(Debug, Clone, PartialEq)]
pub struct GatherStop {
    /// Access waypoint of the storage location.
    pub location: WaypointId,

    /// Pod holding the item.
    pub pod: PodId,

    /// Wire address of the storage location, for optimizer translation and
    /// pick bookkeeping.
    pub address: String,

    /// Pick service time in seconds (mate-assisted baseline).
    pub service_secs: f64,
}

/// A multi-stop gather plan for one order.
///
/// Owned exclusively by the executing station; reassignment destroys the
/// task together with its unconsumed states.
#[derive(Debug, Clone, PartialEq)]
pub struct GatherTask {
    /// The originating order.
    pub order: OrderId,

    /// Stops in visiting order.
    pub stops: Vec<GatherStop>,
}

impl GatherTask {
    pub fn new(order: OrderId, stops: Vec<GatherStop>) -> Self {
        Self { order, stops }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// Composite goal currently bound to an agent.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Task {
    /// No goal.  The agent is idle and will be offered work next pass.
    #[default]
    None,

    /// Park at the claimed resting slot until work arrives.
    Rest { at: WaypointId },

    /// Gather the items of one order across multiple storage locations.
    MultiPointGather(GatherTask),

    /// Mate-side: cover a station's pick at a rendezvous location.
    Assist { station: StationId, at: WaypointId },

    /// Forced teardown: break off, move to a safe waypoint, and hold until
    /// a replacement task arrives.
    Aborting,
}

impl Task {
    /// The order this task is gathering for, if any.
    pub fn order(&self) -> Option<OrderId> {
        match self {
            Task::MultiPointGather(g) => Some(g.order),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Task::None)
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Task::Rest { .. })
    }
}
