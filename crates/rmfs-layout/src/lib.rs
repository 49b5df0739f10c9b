//! `rmfs-layout` — the physical warehouse: waypoints, adjacency, stands, and
//! the path/time oracle.
//!
//! Layout generation from map files is an application concern; this crate
//! only models the graph the coordination layer needs: which waypoints
//! exist, how they connect, which are storage/rest/stand/queue locations,
//! and how long an agent takes to get from one to another.
//!
//! Path planning proper (collision-aware routing) is deliberately outside
//! the crate boundary: the simulation consumes it through the narrow
//! [`PathOracle`] trait ("predict arrival time / give me the next hop"), and
//! [`DijkstraOracle`] is the shortest-path reference implementation.

pub mod error;
pub mod graph;
pub mod oracle;
pub mod stands;
pub mod waypoint;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{LayoutError, LayoutResult};
pub use graph::{WaypointGraph, WaypointGraphBuilder};
pub use oracle::{DijkstraOracle, PathOracle};
pub use stands::{PalletStands, StandKind};
pub use waypoint::{Waypoint, WaypointFlags};
