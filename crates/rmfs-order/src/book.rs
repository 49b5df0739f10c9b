//! The order book: ownership and the three-set status partition.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use rmfs_agent::StationState;
use rmfs_core::{OrderId, SimTime};

use crate::observer::OrderObserver;
use crate::order::{Order, OrderLine};
use crate::{OrderError, OrderResult};

/// Owns every order of the run and tracks which of the three status sets
/// each one is in.
///
/// Invariant: `|pending| + |assigned| + |completed| == total_created`, and
/// an order ID appears in exactly one set.  All transitions go through
/// [`allocate`][Self::allocate] and [`complete`][Self::complete], which
/// preserve the partition by construction.
#[derive(Default)]
pub struct OrderBook {
    orders: FxHashMap<OrderId, Order>,

    /// Unassigned orders in submission (FIFO) order.
    pending: VecDeque<OrderId>,

    /// Orders bound to some station.
    assigned: FxHashSet<OrderId>,

    /// Orders fully served, in completion order.
    completed: Vec<OrderId>,

    total_created: usize,

    observers: Vec<Box<dyn OrderObserver>>,

    next_id: u32,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer to lifecycle events.
    pub fn add_observer(&mut self, observer: Box<dyn OrderObserver>) {
        self.observers.push(observer);
    }

    // ── Submission ────────────────────────────────────────────────────────

    /// Create a new pending order from its lines.
    pub fn submit(
        &mut self,
        lines: Vec<OrderLine>,
        created: SimTime,
        deadline: Option<SimTime>,
    ) -> OrderId {
        let id = OrderId(self.next_id);
        self.next_id += 1;
        self.orders.insert(id, Order { id, created, deadline, lines });
        self.pending.push_back(id);
        self.total_created += 1;
        id
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Bind `order` to `station`.
    ///
    /// Returns `Ok(false)` — a no-op with the order left pending — when the
    /// station no longer has capacity.  Errors if the order is not pending.
    pub fn allocate(
        &mut self,
        order: OrderId,
        station: &mut StationState,
        now: SimTime,
    ) -> OrderResult<bool> {
        if !self.orders.contains_key(&order) {
            return Err(OrderError::UnknownOrder(order));
        }
        if !self.pending.contains(&order) {
            return Err(OrderError::NotPending(order));
        }
        if !station.capacity.bind(order) {
            return Ok(false);
        }
        self.pending.retain(|&o| o != order);
        self.assigned.insert(order);
        debug!(%order, station = %station.id, %now, "order allocated");
        for obs in &mut self.observers {
            obs.on_order_allocated(order, station.id);
        }
        Ok(true)
    }

    /// Record that `station` served every position of `order`.
    pub fn complete(
        &mut self,
        order: OrderId,
        station: &mut StationState,
        now: SimTime,
    ) -> OrderResult<()> {
        if !self.assigned.remove(&order) {
            return Err(OrderError::NotAssigned(order));
        }
        self.completed.push(order);
        station.capacity.unbind(order);
        station.capacity.completed += 1;
        station.stats.orders_completed += 1;
        debug!(%order, station = %station.id, %now, "order completed");
        for obs in &mut self.observers {
            obs.on_order_completed(order, station.id);
        }
        Ok(())
    }

    /// Mark one position of an assigned order picked.
    pub fn mark_line_completed(&mut self, order: OrderId, address: &str) -> OrderResult<bool> {
        let o = self
            .orders
            .get_mut(&order)
            .ok_or(OrderError::UnknownOrder(order))?;
        Ok(o.mark_line_completed(address))
    }

    /// Restock hook from inventory replenishment.
    pub fn on_refilling_ended(&mut self, address: &str, qty: u32) {
        for obs in &mut self.observers {
            obs.on_refilling_ended(address, qty);
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn order(&self, id: OrderId) -> OrderResult<&Order> {
        self.orders.get(&id).ok_or(OrderError::UnknownOrder(id))
    }

    /// Head of the pending FIFO, if any.
    pub fn pending_head(&self) -> Option<OrderId> {
        self.pending.front().copied()
    }

    /// Pending IDs in FIFO order.
    pub fn pending_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.pending.iter().copied()
    }

    pub fn is_assigned(&self, id: OrderId) -> bool {
        self.assigned.contains(&id)
    }

    // ── Audit ─────────────────────────────────────────────────────────────

    /// `(pending, assigned, completed)` set sizes.
    pub fn partition_counts(&self) -> (usize, usize, usize) {
        (self.pending.len(), self.assigned.len(), self.completed.len())
    }

    pub fn total_created(&self) -> usize {
        self.total_created
    }

    /// Conservation check: the three sets partition every created order.
    pub fn partition_ok(&self) -> bool {
        let (p, a, c) = self.partition_counts();
        if p + a + c != self.total_created {
            return false;
        }
        // Disjointness: pending ∩ assigned = ∅, completed ∩ others = ∅.
        self.pending.iter().all(|id| !self.assigned.contains(id))
            && self
                .completed
                .iter()
                .all(|id| !self.assigned.contains(id) && !self.pending.contains(id))
    }

    pub fn all_completed(&self) -> bool {
        let (p, a, _) = self.partition_counts();
        p == 0 && a == 0 && self.total_created > 0
    }
}
