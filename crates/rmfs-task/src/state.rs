//! Atomic agent states.

use rmfs_core::{StationId, WaypointId};
use rmfs_ledger::ResourceLedger;

use crate::lookahead::LookaheadClass;

// ── State ─────────────────────────────────────────────────────────────────────

/// One atomic step in an agent's execution plan.
///
/// Every state carries the waypoint it plays out at.  States execute to
/// completion: a `Move` completes when the agent reaches its destination,
/// waiting states complete when the mate scheduler signals, service states
/// complete after their fixed duration.  On completion the state is popped;
/// an agent with an empty queue is idle and is handed to the task allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Travel to `to` under the external motion model.
    Move { to: WaypointId },

    /// Park at `at` until the assigned mate arrives and the assist completes.
    /// `locked` mirrors a position lock held in the ledger for the pair.
    WaitingForMate { at: WaypointId, locked: bool },

    /// See-off variant of the wait: the covering mate accompanies the robot
    /// between rendezvous points instead of being re-matched after each one.
    WaitingForSeeOff { at: WaypointId, locked: bool },

    /// Re-secure a partially filled bin before resuming an interrupted
    /// gather.  Fixed service duration.
    PreparePartialTask { at: WaypointId },

    /// Pick up a pallet at an input stand.  The stand's inbound counter was
    /// incremented when this state was planned.
    GetPallet { stand: WaypointId },

    /// Set down the finished pallet at an output stand.  Same inbound
    /// accounting as `GetPallet`.
    PutPallet { stand: WaypointId },

    /// Self-assisted pick: the station retrieves the item without a mate,
    /// at a service-time penalty.
    PickItem { at: WaypointId },

    /// Redirect: replace the current travel target with `to`.  Only ever
    /// occupies the queue head.
    ChangeDestination { to: WaypointId },

    /// Abort: break off the current leg, travel to `at`, and hold there
    /// until the task is replaced.  Only ever occupies the queue head.
    AbortMoveToAndWait { at: WaypointId },

    /// Park at the claimed resting slot `at` until a task arrives.
    Rest { at: WaypointId },

    /// Mate-side: perform the pick for `station` at `at`.
    PerformAssist { station: StationId, at: WaypointId },
}

impl State {
    /// The waypoint this state plays out at.
    pub fn destination(&self) -> WaypointId {
        match *self {
            State::Move { to }
            | State::ChangeDestination { to } => to,
            State::WaitingForMate { at, .. }
            | State::WaitingForSeeOff { at, .. }
            | State::PreparePartialTask { at }
            | State::PickItem { at }
            | State::AbortMoveToAndWait { at }
            | State::Rest { at }
            | State::PerformAssist { at, .. } => at,
            State::GetPallet { stand } | State::PutPallet { stand } => stand,
        }
    }

    /// Fieldless discriminant, for table lookups and logging.
    pub fn kind(&self) -> StateKind {
        match self {
            State::Move { .. } => StateKind::Move,
            State::WaitingForMate { .. } => StateKind::WaitingForMate,
            State::WaitingForSeeOff { .. } => StateKind::WaitingForSeeOff,
            State::PreparePartialTask { .. } => StateKind::PreparePartialTask,
            State::GetPallet { .. } => StateKind::GetPallet,
            State::PutPallet { .. } => StateKind::PutPallet,
            State::PickItem { .. } => StateKind::PickItem,
            State::ChangeDestination { .. } => StateKind::ChangeDestination,
            State::AbortMoveToAndWait { .. } => StateKind::AbortMoveToAndWait,
            State::Rest { .. } => StateKind::Rest,
            State::PerformAssist { .. } => StateKind::PerformAssist,
        }
    }

    /// Return this state's outstanding resource claims to the ledger.
    ///
    /// Called by the queue's discard paths for every state dropped before it
    /// executed.  Releases are idempotent at the ledger, so a state whose
    /// claim was already returned through another path is harmless.
    pub fn release_on_discard(&self, ledger: &mut ResourceLedger) {
        match *self {
            State::Rest { at } => ledger.release_resting(at),
            State::WaitingForMate { at, locked: true }
            | State::WaitingForSeeOff { at, locked: true } => ledger.free_position(at),
            State::GetPallet { stand } | State::PutPallet { stand } => {
                ledger.clear_inbound(stand)
            }
            _ => {}
        }
    }
}

// ── StateKind ─────────────────────────────────────────────────────────────────

/// Fieldless mirror of [`State`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    Move,
    WaitingForMate,
    WaitingForSeeOff,
    PreparePartialTask,
    GetPallet,
    PutPallet,
    PickItem,
    ChangeDestination,
    AbortMoveToAndWait,
    Rest,
    PerformAssist,
}

impl StateKind {
    /// The single table driving all rendezvous lookahead.
    ///
    /// Lookahead walks the queue counting `Rendezvous`-class states and
    /// skipping everything else, so a redirect state sitting at the head
    /// (the abort/reroute shapes) shifts the walk by one without any call
    /// site special-casing the queue's layout.
    pub fn lookahead_class(self) -> LookaheadClass {
        match self {
            StateKind::Move => LookaheadClass::Motion,
            StateKind::WaitingForMate | StateKind::WaitingForSeeOff => {
                LookaheadClass::Rendezvous
            }
            StateKind::PreparePartialTask
            | StateKind::GetPallet
            | StateKind::PutPallet
            | StateKind::PickItem
            | StateKind::Rest
            | StateKind::PerformAssist => LookaheadClass::Service,
            StateKind::ChangeDestination | StateKind::AbortMoveToAndWait => {
                LookaheadClass::Redirect
            }
        }
    }
}
