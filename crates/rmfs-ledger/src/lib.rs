//! `rmfs-ledger` — the single source of truth for exclusive physical claims.
//!
//! Every component that needs a physically exclusive resource — a rendezvous
//! waypoint, an idle-parking slot, admission to a stand approach zone, a
//! share of a stand's inbound traffic — claims it here rather than keeping a
//! private reservation flag.  All mutations are synchronous and take effect
//! within the current update pass; there is no transaction spanning passes.
//!
//! # Release semantics
//!
//! Acquisition is strict (a double position lock is a coordination bug and
//! errors loudly), release is forgiving (freeing an already-free resource is
//! an idempotent no-op, logged at `warn`).  The asymmetry is deliberate:
//! discard paths fan in from task replacement, aborts, and assist teardown,
//! and may legitimately race each other within a pass.

pub mod error;
pub mod ledger;


pub use error::{LedgerError, LedgerResult};
pub use ledger::ResourceLedger;
