//! The movable-station agent (mobile picking robot).

use rmfs_core::{ActorId, OrderId, SimTime, StationId, WaypointId, ZoneId};
use rmfs_task::{StateQueue, StateKind, Task};

use crate::movement::MovementState;
use crate::stats::AgentStats;
use crate::traits::{Drivable, Tasked};

// ── StationCapacity ───────────────────────────────────────────────────────────

/// Order-capacity accounting for one station.
#[derive(Clone, Debug)]
pub struct StationCapacity {
    /// Orders this station may hold at once.
    pub capacity: u32,

    /// Orders currently bound to the station, in binding order.
    pub assigned: Vec<OrderId>,

    /// Orders completed over the run.
    pub completed: u32,
}

impl StationCapacity {
    pub fn new(capacity: u32) -> Self {
        Self { capacity, assigned: Vec::new(), completed: 0 }
    }

    /// Slots in use.
    #[inline]
    pub fn in_use(&self) -> u32 {
        self.assigned.len() as u32
    }

    /// `true` while another order may be bound.
    #[inline]
    pub fn has_capacity(&self) -> bool {
        self.in_use() < self.capacity
    }

    /// Record a binding.  Returns `false` (and changes nothing) at capacity.
    pub fn bind(&mut self, order: OrderId) -> bool {
        if !self.has_capacity() {
            return false;
        }
        self.assigned.push(order);
        true
    }

    /// Remove a completed or withdrawn order.  Returns `false` if absent.
    pub fn unbind(&mut self, order: OrderId) -> bool {
        match self.assigned.iter().position(|&o| o == order) {
            Some(idx) => {
                self.assigned.remove(idx);
                true
            }
            None => false,
        }
    }
}

// ── StationState ──────────────────────────────────────────────────────────────

/// One mobile picking station.
#[derive(Debug)]
pub struct StationState {
    pub id: StationId,

    /// Cruise speed in m/s.
    pub speed_mps: f64,

    pub movement: MovementState,
    pub task: Task,
    pub queue: StateQueue,
    pub capacity: StationCapacity,
    pub stats: AgentStats,

    /// `true` while the station carries a pallet between stands.
    pub carrying_pallet: bool,

    /// Addresses already picked for the active order, in pick order.
    /// Cleared when the order completes.  Feeds partial-order snapshots and
    /// the optimizer consistency check.
    pub gathered: Vec<String>,

    /// Completion instant of the in-flight service state, or `NEVER`.
    pub service_until: SimTime,

    /// Last resting slot this station used, preferred on the next rest if
    /// still free.
    pub last_rest: Option<WaypointId>,

    /// Kind of the most recently completed state.
    pub last_completed: Option<StateKind>,

    /// Queue zone the station currently occupies, if any.
    pub in_zone: Option<ZoneId>,
}

impl StationState {
    pub fn new(id: StationId, at: WaypointId, speed_mps: f64, capacity: u32) -> Self {
        Self {
            id,
            speed_mps,
            movement: MovementState::stationary(at, SimTime::ZERO),
            task: Task::None,
            queue: StateQueue::new(),
            capacity: StationCapacity::new(capacity),
            stats: AgentStats::default(),
            carrying_pallet: false,
            gathered: Vec::new(),
            service_until: SimTime::NEVER,
            last_rest: None,
            last_completed: None,
            in_zone: None,
        }
    }

    /// First assigned order whose gather has not started or finished, if the
    /// station can take on new work.
    pub fn next_assigned_order(&self) -> Option<OrderId> {
        self.capacity.assigned.first().copied()
    }
}

impl Tasked for StationState {
    fn actor_id(&self) -> ActorId {
        ActorId::Station(self.id)
    }
    fn task(&self) -> &Task {
        &self.task
    }
    fn task_mut(&mut self) -> &mut Task {
        &mut self.task
    }
    fn queue(&self) -> &StateQueue {
        &self.queue
    }
    fn queue_mut(&mut self) -> &mut StateQueue {
        &mut self.queue
    }
}

impl Drivable for StationState {
    fn movement(&self) -> &MovementState {
        &self.movement
    }
    fn movement_mut(&mut self) -> &mut MovementState {
        &mut self.movement
    }
    fn speed_mps(&self) -> f64 {
        self.speed_mps
    }
}
