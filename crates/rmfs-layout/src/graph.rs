//! Warehouse graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `WaypointId w`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ out_start[w] .. out_start[w+1] ]
//! ```
//!
//! Edge arrays are sorted by source waypoint, so iterating a waypoint's
//! neighbors is a contiguous memory scan — ideal for Dijkstra's inner loop.
//!
//! # Address index
//!
//! Addressable storage locations carry a string tag (`Waypoint::address`).
//! The graph maintains a reverse index so the optimizer protocol can
//! translate between internal waypoint IDs and wire addresses in O(1).

use std::collections::HashMap;

use rmfs_core::{PodId, WaypointId, ZoneId};

use crate::waypoint::Waypoint;
use crate::{LayoutError, LayoutResult};

// ── WaypointGraph ─────────────────────────────────────────────────────────────

/// Directed waypoint graph in CSR format plus the address index.
///
/// Node fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`WaypointGraphBuilder`].
pub struct WaypointGraph {
    /// All waypoints, indexed by `WaypointId`.
    pub waypoints: Vec<Waypoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of waypoint `w` are at positions
    /// `out_start[w] .. out_start[w+1]`.  Length = `waypoint_count + 1`.
    pub out_start: Vec<u32>,

    /// Destination waypoint of each edge, sorted by source.
    pub edge_to: Vec<WaypointId>,

    /// Length of each edge in metres.
    pub edge_length_m: Vec<f32>,

    /// Reverse index: address tag → waypoint.
    address_index: HashMap<String, WaypointId>,
}

impl WaypointGraph {
    /// Construct an empty graph with no waypoints.
    pub fn empty() -> Self {
        WaypointGraphBuilder::new().build()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn contains(&self, wp: WaypointId) -> bool {
        wp.index() < self.waypoints.len()
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Neighbors reachable in one hop from `wp`, paired with edge lengths.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn neighbors(&self, wp: WaypointId) -> impl Iterator<Item = (WaypointId, f32)> + '_ {
        let start = self.out_start[wp.index()] as usize;
        let end = self.out_start[wp.index() + 1] as usize;
        (start..end).map(|i| (self.edge_to[i], self.edge_length_m[i]))
    }

    /// Length in metres of the direct edge `from → to`, if one exists.
    pub fn edge_length(&self, from: WaypointId, to: WaypointId) -> Option<f32> {
        self.neighbors(from)
            .find(|&(next, _)| next == to)
            .map(|(_, len)| len)
    }

    // ── Addresses ─────────────────────────────────────────────────────────

    /// The waypoint carrying `address`, if registered.
    pub fn waypoint_by_address(&self, address: &str) -> Option<WaypointId> {
        self.address_index.get(address).copied()
    }

    /// The address tag of `wp`, if it has one.
    pub fn address_of(&self, wp: WaypointId) -> Option<&str> {
        self.waypoints.get(wp.index())?.address.as_deref()
    }

    // ── Pods ──────────────────────────────────────────────────────────────

    /// Store `pod` at `wp`.
    ///
    /// Errors if `wp` is not a storage location or already holds a pod —
    /// two pods on one waypoint is a physical impossibility, not a state to
    /// silently overwrite.
    pub fn place_pod(&mut self, wp: WaypointId, pod: PodId) -> LayoutResult<()> {
        let node = self
            .waypoints
            .get_mut(wp.index())
            .ok_or(LayoutError::UnknownWaypoint(wp))?;
        if !node.flags.pod_storage {
            return Err(LayoutError::NotStorage(wp));
        }
        if let Some(occupant) = node.pod {
            return Err(LayoutError::WaypointOccupied { waypoint: wp, occupant, pod });
        }
        node.pod = Some(pod);
        Ok(())
    }

    /// Remove and return the pod stored at `wp`, if any.
    pub fn take_pod(&mut self, wp: WaypointId) -> Option<PodId> {
        self.waypoints.get_mut(wp.index())?.pod.take()
    }

    /// The pod currently stored at `wp`, if any.
    pub fn pod_at(&self, wp: WaypointId) -> Option<PodId> {
        self.waypoints.get(wp.index())?.pod
    }
}

// ── WaypointGraphBuilder ──────────────────────────────────────────────────────

/// Incremental graph builder.  Collects waypoints and edges in insertion
/// order, then sorts edges into CSR form in [`build`][Self::build].
pub struct WaypointGraphBuilder {
    waypoints: Vec<Waypoint>,
    edges: Vec<(WaypointId, WaypointId, f32)>,
}

impl WaypointGraphBuilder {
    pub fn new() -> Self {
        Self { waypoints: Vec::new(), edges: Vec::new() }
    }

    /// Append a waypoint; its `WaypointId` is its insertion position.
    pub fn add_waypoint(&mut self, wp: Waypoint) -> WaypointId {
        let id = WaypointId(self.waypoints.len() as u32);
        self.waypoints.push(wp);
        id
    }

    /// Append a plain travel waypoint at `(row, col)`.
    pub fn add_plain(&mut self, row: u32, col: u32) -> WaypointId {
        self.add_waypoint(Waypoint::plain(row, col))
    }

    /// Directed edge `from → to` of `length_m` metres.
    pub fn connect(&mut self, from: WaypointId, to: WaypointId, length_m: f32) {
        self.edges.push((from, to, length_m));
    }

    /// Two directed edges, one each way.
    pub fn connect_bidirectional(&mut self, a: WaypointId, b: WaypointId, length_m: f32) {
        self.connect(a, b, length_m);
        self.connect(b, a, length_m);
    }

    /// Convenience: a fully 4-connected `rows × cols` grid with uniform cell
    /// spacing.  Returns the waypoint at `(row, col)` as
    /// `WaypointId(row * cols + col)`.
    pub fn grid(rows: u32, cols: u32, spacing_m: f32) -> Self {
        let mut b = Self::new();
        for r in 0..rows {
            for c in 0..cols {
                b.add_plain(r, c);
            }
        }
        let at = |r: u32, c: u32| WaypointId(r * cols + c);
        for r in 0..rows {
            for c in 0..cols {
                if c + 1 < cols {
                    b.connect_bidirectional(at(r, c), at(r, c + 1), spacing_m);
                }
                if r + 1 < rows {
                    b.connect_bidirectional(at(r, c), at(r + 1, c), spacing_m);
                }
            }
        }
        b
    }

    /// Mutable access to an already-added waypoint, for setting flags,
    /// addresses, and zones before `build`.
    pub fn waypoint_mut(&mut self, wp: WaypointId) -> &mut Waypoint {
        &mut self.waypoints[wp.index()]
    }

    /// Tag `wp` as an addressable pod-storage location.
    pub fn set_storage(&mut self, wp: WaypointId, address: impl Into<String>) {
        let node = self.waypoint_mut(wp);
        node.flags.pod_storage = true;
        node.flags.is_access_point = true;
        node.address = Some(address.into());
    }

    /// Tag `wp` as a member of queue zone `zone`, optionally chained to the
    /// next waypoint in the approach lane.
    pub fn set_queue(&mut self, wp: WaypointId, zone: ZoneId, next: Option<WaypointId>) {
        let node = self.waypoint_mut(wp);
        node.flags.is_queue_waypoint = true;
        node.zone = Some(zone);
        node.next_queue_waypoint = next;
    }

    /// Mark `wp` unusable for travel and storage.
    pub fn set_forbidden(&mut self, wp: WaypointId) {
        let node = self.waypoint_mut(wp);
        node.flags.forbidden = true;
        node.flags.unavailable_storage = true;
    }

    /// Sort edges into CSR form and produce the final graph.
    pub fn build(self) -> WaypointGraph {
        let n = self.waypoints.len();
        let mut edges = self.edges;
        edges.sort_unstable_by_key(|&(from, to, _)| (from, to));

        let mut out_start = vec![0u32; n + 1];
        for &(from, _, _) in &edges {
            out_start[from.index() + 1] += 1;
        }
        for i in 1..=n {
            out_start[i] += out_start[i - 1];
        }

        let edge_to = edges.iter().map(|&(_, to, _)| to).collect();
        let edge_length_m = edges.iter().map(|&(_, _, len)| len).collect();

        let address_index = self
            .waypoints
            .iter()
            .enumerate()
            .filter_map(|(i, wp)| {
                wp.address
                    .as_ref()
                    .map(|a| (a.clone(), WaypointId(i as u32)))
            })
            .collect();

        WaypointGraph {
            waypoints: self.waypoints,
            out_start,
            edge_to,
            edge_length_m,
            address_index,
        }
    }
}

impl Default for WaypointGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
