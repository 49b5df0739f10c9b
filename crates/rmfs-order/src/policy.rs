//! The pluggable order-batching boundary.

use rmfs_agent::StationState;
use rmfs_core::SimTime;
use rmfs_layout::WaypointGraph;

use crate::book::OrderBook;
use crate::OrderResult;

/// Order-to-station assignment strategy.
///
/// This two-method contract is the entire boundary: the controller calls
/// [`signal_current_time`][Self::signal_current_time] once per update pass
/// and then [`decide_about_pending_orders`][Self::decide_about_pending_orders],
/// and any conforming implementation may be substituted at construction —
/// greedy, remote-optimized, or otherwise.
pub trait BatchingPolicy {
    /// Inform the policy of the current simulation instant.
    fn signal_current_time(&mut self, now: SimTime);

    /// Examine available stations and the pending set, performing zero or
    /// more allocations on `book`.
    ///
    /// Resource exhaustion (no capacity anywhere, nothing pending) is a
    /// normal outcome, not an error.  A hard decision failure (remote
    /// optimizer unreachable or inconsistent) aborts the pass.
    fn decide_about_pending_orders(
        &mut self,
        book: &mut OrderBook,
        stations: &mut [StationState],
        graph: &WaypointGraph,
    ) -> OrderResult<()>;
}
