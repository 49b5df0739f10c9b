//! Path/time oracle trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The coordination layer never plans paths itself; it asks an oracle two
//! questions — "when would this agent arrive there?" and "which waypoint is
//! the next hop?" — through the [`PathOracle`] trait.  Applications can swap
//! in a reservation-aware or windowed planner without touching the managers.
//! The default [`DijkstraOracle`] is distance-optimal and ignores other
//! agents, which is sufficient for the coordination core: estimates are
//! revised on every path change anyway.
//!
//! # Cost units
//!
//! Edge costs are metres; the oracle divides by the agent's cruise speed to
//! produce seconds.  Estimates are approximate by contract — callers must
//! tolerate revision.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rmfs_core::{SimTime, WaypointId};

use crate::graph::WaypointGraph;
use crate::{LayoutError, LayoutResult};

// ── PathOracle trait ──────────────────────────────────────────────────────────

/// Narrow interface to path planning.
///
/// Implementations must refuse `forbidden` targets and must never route
/// through a `forbidden` waypoint.
pub trait PathOracle: Send + Sync {
    /// Estimated seconds to travel `from → to` at cruise speed `speed_mps`.
    fn travel_secs(
        &self,
        graph: &WaypointGraph,
        from: WaypointId,
        to: WaypointId,
        speed_mps: f64,
    ) -> LayoutResult<f64>;

    /// The first hop on the current best path `from → to`.
    ///
    /// Returns `Ok(to)` when already adjacent, and an error when no path
    /// exists.  `from == to` yields `Ok(to)`.
    fn next_waypoint(
        &self,
        graph: &WaypointGraph,
        from: WaypointId,
        to: WaypointId,
    ) -> LayoutResult<WaypointId>;

    /// Predicted absolute arrival instant, `now` plus travel time.
    ///
    /// Returns [`SimTime::NEVER`] when the destination is unreachable — an
    /// unreachable rendezvous is starvation to be observed, not a panic.
    fn predict_arrival(
        &self,
        graph: &WaypointGraph,
        from: WaypointId,
        to: WaypointId,
        speed_mps: f64,
        now: SimTime,
    ) -> SimTime {
        match self.travel_secs(graph, from, to, speed_mps) {
            Ok(secs) => now.offset(secs),
            Err(_) => SimTime::NEVER,
        }
    }
}

// ── DijkstraOracle ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR waypoint graph.
///
/// Costs are edge lengths in metres; forbidden waypoints are skipped both as
/// targets and as intermediates.  Ties break on `WaypointId` for determinism.
pub struct DijkstraOracle;

impl PathOracle for DijkstraOracle {
    fn travel_secs(
        &self,
        graph: &WaypointGraph,
        from: WaypointId,
        to: WaypointId,
        speed_mps: f64,
    ) -> LayoutResult<f64> {
        let (dist_m, _) = shortest_path(graph, from, to)?;
        Ok(dist_m as f64 / speed_mps.max(f64::MIN_POSITIVE))
    }

    fn next_waypoint(
        &self,
        graph: &WaypointGraph,
        from: WaypointId,
        to: WaypointId,
    ) -> LayoutResult<WaypointId> {
        if from == to {
            return Ok(to);
        }
        let (_, first_hop) = shortest_path(graph, from, to)?;
        Ok(first_hop)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Returns `(total_metres, first_hop)` of the shortest `from → to` path.
fn shortest_path(
    graph: &WaypointGraph,
    from: WaypointId,
    to: WaypointId,
) -> LayoutResult<(f32, WaypointId)> {
    if !graph.contains(from) {
        return Err(LayoutError::UnknownWaypoint(from));
    }
    if !graph.contains(to) {
        return Err(LayoutError::UnknownWaypoint(to));
    }
    if graph.waypoints[to.index()].flags.forbidden {
        return Err(LayoutError::ForbiddenTarget(to));
    }
    if from == to {
        return Ok((0.0, to));
    }

    let n = graph.waypoint_count();
    // Costs in millimetres (u64) so the heap stays totally ordered.
    let mut dist = vec![u64::MAX; n];
    // prev[v] = waypoint that reached v; INVALID for unreached nodes.
    let mut prev = vec![WaypointId::INVALID; n];

    dist[from.index()] = 0;

    // Min-heap: Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key WaypointId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u64, WaypointId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            let first_hop = first_hop_of(&prev, from, to);
            return Ok((cost as f32 / 1_000.0, first_hop));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for (next, length_m) in graph.neighbors(node) {
            if graph.waypoints[next.index()].flags.forbidden {
                continue;
            }
            let new_cost = cost.saturating_add((length_m * 1_000.0) as u64);
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev[next.index()] = node;
                heap.push(Reverse((new_cost, next)));
            }
        }
    }

    Err(LayoutError::NoRoute { from, to })
}

/// Trace `prev` links back from `to` until the node whose predecessor is
/// `from` — that node is the first hop.
fn first_hop_of(prev: &[WaypointId], from: WaypointId, to: WaypointId) -> WaypointId {
    let mut cur = to;
    loop {
        let p = prev[cur.index()];
        if p == from || p == WaypointId::INVALID {
            return cur;
        }
        cur = p;
    }
}
