//! `rmfs-task` — the vocabulary of agent activities and the per-agent plan.
//!
//! # Model
//!
//! A [`Task`] is a composite goal (gather an order, rest, assist a robot);
//! a [`State`] is one atomic step of its execution plan (move here, wait for
//! a mate, handle a pallet).  Each agent owns exactly one task and one
//! [`StateQueue`] holding the *remaining* plan: popping the head is the only
//! mutation made by normal progress, aborts truncate or replace the tail.
//!
//! # Claims travel with states
//!
//! Several states reference a resource claimed on their behalf — a resting
//! slot, a locked rendezvous position, a stand inbound registration.  When a
//! plan is discarded before those states execute, the claims must go back to
//! the ledger.  That release is automatic here: the queue's discard paths
//! call [`State::release_on_discard`] for every dropped state, so no caller
//! can forget it.

pub mod lookahead;
pub mod queue;
pub mod state;
pub mod task;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use lookahead::LookaheadClass;
pub use queue::StateQueue;
pub use state::{State, StateKind};
pub use task::{GatherStop, GatherTask, Task};
