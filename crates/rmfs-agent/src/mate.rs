//! The mate agent (human picker).

use rmfs_core::{ActorId, MateId, SimTime, StationId, WaypointId};
use rmfs_task::{StateQueue, StateKind, Task};

use crate::movement::MovementState;
use crate::stats::AgentStats;
use crate::traits::{Drivable, Tasked};

/// One human picker.  Assist capacity is 1: a mate covers at most one
/// station at a time.
#[derive(Debug)]
pub struct MateState {
    pub id: MateId,

    /// Walking speed in m/s.
    pub speed_mps: f64,

    pub movement: MovementState,
    pub task: Task,
    pub queue: StateQueue,
    pub stats: AgentStats,

    /// Station this mate currently covers, if any.  Mirrors the scheduler's
    /// assignment table for cheap per-agent checks.
    pub current_assist: Option<StationId>,

    /// Last resting slot, preferred on the next rest if still free.
    pub last_rest: Option<WaypointId>,

    /// Kind of the most recently completed state.
    pub last_completed: Option<StateKind>,
}

impl MateState {
    pub fn new(id: MateId, at: WaypointId, speed_mps: f64) -> Self {
        Self {
            id,
            speed_mps,
            movement: MovementState::stationary(at, SimTime::ZERO),
            task: Task::None,
            queue: StateQueue::new(),
            stats: AgentStats::default(),
            current_assist: None,
            last_rest: None,
            last_completed: None,
        }
    }
}

impl Tasked for MateState {
    fn actor_id(&self) -> ActorId {
        ActorId::Mate(self.id)
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

impl Drivable for MateState {
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
