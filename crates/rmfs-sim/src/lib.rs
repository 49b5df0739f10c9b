//! `rmfs-sim` — the discrete-event controller.
//!
//! # Event loop
//!
//! ```text
//! update pass at t = 0
//! loop:
//!   ① next  — minimum next-event time over all stations (hop arrivals,
//!             service completions), mates, and the mate scheduler
//!             (assist completions)
//!   ② jump  — advance the clock to that instant
//!   ③ pass  — one update pass in fixed dependency order:
//!               order policy → task allocation → assist completions →
//!               agent advancement → assist starts → drained-agent
//!               re-allocation
//!   until the configured duration elapses, a stop is signaled, or no
//!   events remain
//! ```
//!
//! Within a pass, zero-duration consequences cascade (a freed robot starts
//! moving, a freed mate is re-matched and starts walking) until the pass
//! reaches a fixpoint; everything that takes time becomes a future event.
//!
//! Manager order within a pass is a visibility guarantee: an order bound by
//! the batching policy is seen by task allocation in the same pass, and an
//! assist completed by the scheduler lets the robot resume movement in the
//! same pass.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rmfs_layout::DijkstraOracle;
//! use rmfs_sim::{ControllerBuilder, NoopObserver};
//!
//! let mut sim = ControllerBuilder::new(config, graph, stands, DijkstraOracle)
//!     .stations(station_positions, 1.5)
//!     .mates(mate_positions, 1.2)
//!     .resting_locations(rest_slots)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod controller;
pub mod error;
pub mod observer;


pub use builder::ControllerBuilder;
pub use controller::Controller;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
