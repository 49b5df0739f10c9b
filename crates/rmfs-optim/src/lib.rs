//! `rmfs-optim` — the remote-optimizer strategy and its wire protocol.
//!
//! # Protocol
//!
//! JSON over HTTP against four endpoints:
//!
//! | Endpoint                | Direction of decision                         |
//! |-------------------------|-----------------------------------------------|
//! | `POST /init`            | one-time layout/agent facts                   |
//! | `POST /get_order`       | which pending order the calling station takes |
//! | `POST /get_item`        | the next pick address for the calling station |
//! | `POST /get_picker_schedules` | per-picker ordered assist assignments    |
//!
//! The three batch-taking endpoints all receive the same snapshot shape:
//! in-progress partial orders (a robot is already gathering them) plus up to
//! `pending_batch_limit` pending whole orders, with every location
//! translated from internal waypoint IDs to wire addresses.
//!
//! # Failure semantics
//!
//! An unreachable optimizer, a malformed response, or a response that
//! contradicts an item a robot has already picked is a hard failure of the
//! current decision cycle — running on an inconsistent schedule is worse
//! than stopping, so nothing here falls back silently.

pub mod batch;
pub mod check;
pub mod client;
pub mod dto;
pub mod error;
pub mod remote;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use batch::snapshot_batch;
pub use check::OptimizationCheck;
pub use client::OptimizerClient;
pub use dto::{
    BotInfo, InitRequest, InitResponse, ItemResponse, OrderBatch, OrderInfo, PickerAssignment,
    PickerInfo, PickerSchedule, PickerSchedulesResponse,
};
pub use error::{OptimError, OptimResult};
pub use remote::RemoteBatching;
