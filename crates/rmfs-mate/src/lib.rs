//! `rmfs-mate` — matching human pickers to robots that need assistance.
//!
//! # The problem
//!
//! Stations park at pick locations and wait; mates (assist capacity 1) walk
//! between those locations.  Whenever a robot's predicted arrival at its
//! next assist point changes, the scheduler reconsiders which mate should
//! cover it — bounded by a switching threshold (a change must save at least
//! that many seconds of mate travel) and a per-request switch budget that
//! stops assignments oscillating between competing robots.
//!
//! # Backpressure, not failure
//!
//! When no mate can cover a request, the robot simply waits at its pick
//! location in a `WaitingFor*` state.  That wait is the system's
//! backpressure mechanism while mates are the scarcer resource; it surfaces
//! in waiting-time statistics, never as an error.
//!
//! # Strategies
//!
//! Two implementations of the same [`MateScheduling`] event contract,
//! chosen from configuration at construction:
//!
//! - [`EarliestFeasible`] — a freed mate immediately moves to the uncovered
//!   request it can serve soonest.
//! - [`SeeOff`] — a mate stays with its robot through consecutive
//!   rendezvous points and is only released when the robot's chain ends,
//!   trading mate idle time for fewer picker relocations.

pub mod core;
pub mod ctx;
pub mod error;
pub mod request;
pub mod scheduler;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crate::core::SchedulerCore;
pub use ctx::MateCtx;
pub use error::{MateError, MateResult};
pub use request::{ActiveAssist, AssistEvent, AssistRequest};
pub use scheduler::{EarliestFeasible, MateScheduling, SeeOff};
