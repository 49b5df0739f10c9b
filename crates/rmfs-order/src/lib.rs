//! `rmfs-order` — orders, the order book, and batching policies.
//!
//! # Ownership model
//!
//! The [`OrderBook`] owns every order for the whole run.  The three status
//! sets — `pending`, `assigned`, `completed` — hold IDs only, and every
//! order is in exactly one of them at any instant.  That partition is the
//! conservation invariant the rest of the system leans on, and it is
//! auditable at any point via [`OrderBook::partition_ok`].
//!
//! # Pluggable batching
//!
//! Which pending order goes to which station is a strategy decision behind
//! the two-method [`BatchingPolicy`] trait — the controller calls
//! `signal_current_time` and `decide_about_pending_orders`, nothing else.
//! [`GreedyBatching`] is the default; the remote-optimizer policy in
//! `rmfs-optim` implements the same contract.

pub mod book;
pub mod error;
pub mod greedy;
pub mod observer;
pub mod order;
pub mod policy;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use book::OrderBook;
pub use error::{OrderError, OrderResult};
pub use greedy::GreedyBatching;
pub use observer::OrderObserver;
pub use order::{Order, OrderLine};
pub use policy::BatchingPolicy;
