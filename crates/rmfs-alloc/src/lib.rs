//! `rmfs-alloc` — deciding what an idle agent does next.
//!
//! Whenever an agent's state queue drains, the controller hands it here.
//! A station with a bound order gets a gather plan (pallet pickup, one
//! move/pick pair per open line, pallet delivery); a station or mate with
//! nothing to do is sent to rest — or stays idle when the resting pool is
//! empty, which is a valid condition re-polled on the next pass, not an
//! error.
//!
//! # Stand balancing
//!
//! Pallet stands are chosen nearest-first, unless some other stand's
//! inbound counter is lower by at least the configured margin, in which
//! case the least-congested candidate wins.  The chosen stand's counter is
//! incremented at selection time; it comes back when the stand visit
//! completes or when the plan is discarded (the `GetPallet`/`PutPallet`
//! states carry the claim).

pub mod allocator;
pub mod ctx;
pub mod error;

#[cfg(test)]
mod tests;

pub use allocator::TaskAllocator;
pub use ctx::AllocCtx;
pub use error::{AllocError, AllocResult};
