//! Lookahead classification of state kinds.

/// How a state participates in rendezvous lookahead.
///
/// Task construction guarantees two adjacency invariants that make this
/// classification sufficient on its own:
///
/// 1. every `Rendezvous` state is immediately preceded by the `Motion` state
///    that delivers the agent to it;
/// 2. `Redirect` states only ever occupy the queue head.
///
/// Under those invariants, "the waypoint of the next unregistered rendezvous"
/// is computed by one walk over the queue keyed by this table — no call site
/// re-derives queue-shape offsets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LookaheadClass {
    /// Travel; skipped by lookahead.
    Motion,

    /// A mate/robot meeting point; what lookahead counts.
    Rendezvous,

    /// Stationary work (pallet handling, picking, resting); skipped.
    Service,

    /// Abort/reroute head states; skipped, displacing the walk by one.
    Redirect,
}
