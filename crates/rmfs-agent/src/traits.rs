//! Capability traits shared by both agent variants.

use rmfs_core::{ActorId, SimTime, WaypointId};
use rmfs_ledger::ResourceLedger;
use rmfs_task::{StateQueue, Task};

use crate::movement::MovementState;

// ── Tasked ────────────────────────────────────────────────────────────────────

/// An agent that executes tasks through a state queue.
pub trait Tasked {
    fn actor_id(&self) -> ActorId;
    fn task(&self) -> &Task;
    fn task_mut(&mut self) -> &mut Task;
    fn queue(&self) -> &StateQueue;
    fn queue_mut(&mut self) -> &mut StateQueue;

    /// Replace the agent's task.
    ///
    /// Any unconsumed states are discarded, and every resource claim they
    /// referenced — resting slot, position lock, stand inbound registration
    /// — is returned to the ledger in the same pass.  The discarded task is
    /// destroyed with them.
    fn assign_task(&mut self, task: Task, ledger: &mut ResourceLedger) {
        self.queue_mut().discard_all(ledger);
        *self.task_mut() = task;
    }

    /// `true` when the agent has drained its plan and needs new work.
    fn is_idle(&self) -> bool {
        self.queue().is_empty()
    }
}

// ── Drivable ──────────────────────────────────────────────────────────────────

/// An agent that moves across the waypoint graph.
pub trait Drivable {
    fn movement(&self) -> &MovementState;
    fn movement_mut(&mut self) -> &mut MovementState;

    /// Cruise speed in metres per second.
    fn speed_mps(&self) -> f64;

    /// The waypoint the agent currently occupies.
    fn at(&self) -> WaypointId {
        self.movement().from
    }

    /// Time of the agent's next movement event, or `NEVER` when stationary.
    fn next_movement_event(&self) -> SimTime {
        self.movement().next_event()
    }
}
