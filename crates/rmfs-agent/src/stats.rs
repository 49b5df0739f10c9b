//! Per-agent statistics counters.
//!
//! Resource exhaustion (no free slot, no available mate, no capacity) is
//! never an error in this system — it surfaces only here, as accumulated
//! idle and waiting time.

/// Accumulated activity counters for one agent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentStats {
    /// Seconds spent with a hop in flight.
    pub travel_secs: f64,

    /// Seconds spent parked in a waiting state (rendezvous backpressure).
    pub wait_secs: f64,

    /// Seconds spent idle or resting (no task, or a `Rest` state).
    pub idle_secs: f64,

    /// Picks completed (assisted or self-service).
    pub picks: u32,

    /// Assists performed (mates) or received (stations).
    pub assists: u32,

    /// Times the agent was sent to rest.
    pub rests: u32,

    /// Orders completed at this station.
    pub orders_completed: u32,
}
