//! Borrowed world view for allocation decisions.

use rmfs_core::{SimConfig, SimRng, SimTime};
use rmfs_layout::{PalletStands, PathOracle, WaypointGraph};
use rmfs_ledger::ResourceLedger;

/// What the allocator may read and mutate during one decision.
pub struct AllocCtx<'a> {
    pub now: SimTime,
    pub config: &'a SimConfig,
    pub graph: &'a WaypointGraph,
    pub stands: &'a PalletStands,
    pub oracle: &'a dyn PathOracle,
    pub ledger: &'a mut ResourceLedger,
    pub rng: &'a mut SimRng,
}
