//! Mutable world view passed into every scheduler call.

use rmfs_agent::{MateState, StationState};
use rmfs_core::{SimConfig, SimTime};
use rmfs_layout::{PathOracle, WaypointGraph};
use rmfs_ledger::ResourceLedger;

/// Everything a scheduling decision may read or mutate, borrowed for the
/// duration of one call.
///
/// The controller assembles this from its own fields each update pass; the
/// scheduler itself owns only its request/assignment bookkeeping, never
/// world state.
pub struct MateCtx<'a> {
    pub now: SimTime,
    pub config: &'a SimConfig,
    pub graph: &'a WaypointGraph,
    pub oracle: &'a dyn PathOracle,
    pub ledger: &'a mut ResourceLedger,
    pub stations: &'a mut [StationState],
    pub mates: &'a mut [MateState],
}
