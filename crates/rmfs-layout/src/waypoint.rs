//! Waypoint node type and its exclusivity flags.

use rmfs_core::{PodId, WaypointId, ZoneId};

// ── WaypointFlags ─────────────────────────────────────────────────────────────

/// Per-waypoint exclusivity and role bits.
///
/// Flags are orthogonal: a pod-storage waypoint may also be an access point,
/// and a queue waypoint usually belongs to a [`ZoneId`] with a bounded
/// admission count.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WaypointFlags {
    /// Agents may stop here to interact with an adjacent storage location.
    pub is_access_point: bool,

    /// Never a path-planning target and never traversed.
    pub forbidden: bool,

    /// A pod may be stored here.
    pub pod_storage: bool,

    /// Part of a stand approach queue; admission is bounded by the zone
    /// semaphore.
    pub is_queue_waypoint: bool,

    /// Storage slot taken out of service (blocked rack, maintenance).
    pub unavailable_storage: bool,
}

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// One node of the warehouse grid.
///
/// Adjacency lives in the graph's CSR arrays, not here; the waypoint itself
/// carries only position, role flags, and its current occupant pod.
///
/// Invariant: at most one pod occupies a waypoint at a time — enforced by
/// [`WaypointGraph::place_pod`][crate::WaypointGraph::place_pod].
#[derive(Clone, Debug)]
pub struct Waypoint {
    /// Grid row.
    pub row: u32,

    /// Grid column.
    pub col: u32,

    /// Storage-address tag, if this waypoint is an addressable location.
    /// Used to translate waypoint IDs for the optimizer protocol.
    pub address: Option<String>,

    /// Queue zone this waypoint belongs to, if any.
    pub zone: Option<ZoneId>,

    /// Role and exclusivity bits.
    pub flags: WaypointFlags,

    /// Next waypoint in the stand approach queue, when
    /// `flags.is_queue_waypoint` is set.
    pub next_queue_waypoint: Option<WaypointId>,

    /// Pod currently stored here, if any.
    pub pod: Option<PodId>,
}

impl Waypoint {
    /// A plain travel waypoint at `(row, col)` with no roles.
    pub fn plain(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            address: None,
            zone: None,
            flags: WaypointFlags::default(),
            next_queue_waypoint: None,
            pod: None,
        }
    }
}
