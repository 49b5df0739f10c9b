//! The remote-optimizer batching policy.

use tracing::debug;

use rmfs_agent::{Fleet, StationState};
use rmfs_core::{OrderId, SimTime, StationId};
use rmfs_layout::WaypointGraph;
use rmfs_order::{BatchingPolicy, OrderBook, OrderError, OrderResult};

use crate::batch::snapshot_batch;
use crate::check::OptimizationCheck;
use crate::client::OptimizerClient;
use crate::dto::PickerSchedule;
use crate::OptimResult;

/// Delegates order-to-station binding to the remote optimizer.
///
/// Implements the same two-call contract as the greedy policy; the only
/// difference is who decides.  Every decision failure — transport, protocol,
/// consistency — is surfaced as a hard error of the pass: the controller
/// must not keep scheduling on a response it could not trust.
pub struct RemoteBatching {
    client: OptimizerClient,
    pending_limit: usize,
    now: SimTime,
}

impl RemoteBatching {
    pub fn new(client: OptimizerClient, pending_limit: usize) -> Self {
        Self { client, pending_limit, now: SimTime::ZERO }
    }

    /// Ask the optimizer for the next pick address of `station`'s active
    /// order, validated against the items already gathered.
    pub fn next_pick(
        &self,
        book: &OrderBook,
        fleet: &Fleet,
        graph: &WaypointGraph,
        station: &StationState,
    ) -> OptimResult<String> {
        let batch = snapshot_batch(
            book,
            &fleet.stations,
            &fleet.mates,
            graph,
            station.id,
            self.pending_limit,
        );
        let item = self.client.get_item(&batch)?;

        let remaining: Vec<String> = station
            .task
            .order()
            .and_then(|o| book.order(o).ok())
            .map(|o| o.open_lines().map(|l| l.address.clone()).collect())
            .unwrap_or_default();
        OptimizationCheck::check_next_item(&item, &remaining, &station.gathered)?;
        Ok(item)
    }

    /// Fetch the per-picker schedules for the current snapshot.
    pub fn picker_schedules(
        &self,
        book: &OrderBook,
        fleet: &Fleet,
        graph: &WaypointGraph,
        caller: StationId,
    ) -> OptimResult<Vec<PickerSchedule>> {
        let batch = snapshot_batch(
            book,
            &fleet.stations,
            &fleet.mates,
            graph,
            caller,
            self.pending_limit,
        );
        Ok(self.client.get_picker_schedules(&batch)?.picker_schedules)
    }
}

impl BatchingPolicy for RemoteBatching {
    fn signal_current_time(&mut self, now: SimTime) {
        self.now = now;
    }

    fn decide_about_pending_orders(
        &mut self,
        book: &mut OrderBook,
        stations: &mut [StationState],
        graph: &WaypointGraph,
    ) -> OrderResult<()> {
        for idx in 0..stations.len() {
            if book.pending_head().is_none() {
                break;
            }
            if !stations[idx].capacity.has_capacity() {
                continue;
            }

            // Rebuild the snapshot per caller so bindings made earlier in
            // this pass are already visible.  Order binding is a
            // station-only decision; mates are not in this snapshot.
            let caller = stations[idx].id;
            let batch = snapshot_batch(book, stations, &[], graph, caller, self.pending_limit);

            let decided = self
                .client
                .get_order(&batch)
                .map_err(|e| OrderError::Policy(e.to_string()))?;
            if decided < 0 {
                debug!(station = %caller, "optimizer declined to bind an order");
                continue;
            }

            let order = OrderId(decided as u32);
            // A response naming a non-pending order contradicts the snapshot.
            if !book.pending_ids().any(|o| o == order) {
                return Err(OrderError::Policy(format!(
                    "optimizer chose {order} which is not pending"
                )));
            }
            book.allocate(order, &mut stations[idx], self.now)?;
        }
        Ok(())
    }
}
