//! `rmfs-core` — foundational types for the `rust_rmfs` warehouse simulation.
//!
//! This crate is a dependency of every other `rmfs-*` crate.  It intentionally
//! has no `rmfs-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                |
//! |------------|---------------------------------------------------------|
//! | [`ids`]    | `StationId`, `MateId`, `WaypointId`, `OrderId`, `PodId`, `ZoneId`, `ActorId` |
//! | [`time`]   | `SimTime`, `EventClock`                                 |
//! | [`rng`]    | `SimRng` (deterministic, seed-driven)                   |
//! | [`config`] | `SimConfig` and its validation                          |
//! | [`error`]  | `FleetError`, `FleetResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `rmfs-optim` and for config-file loading.      |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{FleetError, FleetResult};
pub use ids::{ActorId, MateId, OrderId, PodId, StationId, WaypointId, ZoneId};
pub use rng::SimRng;
pub use time::{EventClock, SimTime};
