//! Default FIFO batching policy.

use rmfs_agent::StationState;
use rmfs_core::SimTime;
use rmfs_layout::WaypointGraph;

use crate::book::OrderBook;
use crate::policy::BatchingPolicy;
use crate::OrderResult;

/// Bind the head of the pending queue to the first station with free
/// capacity, in discovery order.
///
/// Deliberately simple: no sorting by distance, no lookahead, at most one
/// new order per station per decision pass.  The simplicity is a
/// throughput/latency tradeoff — decisions are O(stations) and never block
/// the tick.
#[derive(Default)]
pub struct GreedyBatching {
    now: SimTime,
}

impl GreedyBatching {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BatchingPolicy for GreedyBatching {
    fn signal_current_time(&mut self, now: SimTime) {
        self.now = now;
    }

    fn decide_about_pending_orders(
        &mut self,
        book: &mut OrderBook,
        stations: &mut [StationState],
        _graph: &WaypointGraph,
    ) -> OrderResult<()> {
        for station in stations.iter_mut() {
            let Some(order) = book.pending_head() else {
                break;
            };
            if !station.capacity.has_capacity() {
                continue;
            }
            // At capacity the allocation is a no-op and the order stays
            // pending for the next station in discovery order.
            book.allocate(order, station, self.now)?;
        }
        Ok(())
    }
}
