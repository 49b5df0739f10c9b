//! `rmfs-agent` — the two agent variants and their shared capabilities.
//!
//! # Variants, not a hierarchy
//!
//! A warehouse agent is either a [`StationState`] (a mobile picking robot,
//! which additionally owns order-capacity accounting) or a [`MateState`]
//! (a human picker with assist capacity 1).  The two are separate structs
//! held in separate `Fleet` vectors; code that works on "any agent" is
//! written against the [`Tasked`] and [`Drivable`] capability traits rather
//! than a common base type, so there is no implicit aliasing between an
//! agent and its station-ness.
//!
//! # Lifecycle
//!
//! Agents are created once at construction and live until teardown; only
//! their task and state queue are replaced during the run.  Task replacement
//! goes through [`Tasked::assign_task`], which discards the old plan with
//! automatic claim release.

pub mod fleet;
pub mod mate;
pub mod movement;
pub mod station;
pub mod stats;
pub mod traits;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use fleet::Fleet;
pub use mate::MateState;
pub use movement::MovementState;
pub use station::{StationCapacity, StationState};
pub use stats::AgentStats;
pub use traits::{Drivable, Tasked};
