//! Per-agent movement state.

use rmfs_core::{SimTime, WaypointId};

/// Movement state of a single agent.
///
/// Motion is hop-by-hop: the agent travels one graph edge at a time toward
/// `target`, and each hop arrival is a discrete event.  Within a hop the
/// model is **teleport-at-arrival**: the agent logically stays at `from`
/// until `hop_arrival`, then instantly occupies `hop_to`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementState {
    /// `true` while a hop is in flight.
    pub in_transit: bool,

    /// Waypoint the agent currently occupies (or departed from, mid-hop).
    pub from: WaypointId,

    /// Next waypoint on the path.  Equals `from` when stationary.
    pub hop_to: WaypointId,

    /// Final destination of the current leg.  Equals `from` when stationary.
    pub target: WaypointId,

    /// Instant the current hop began.
    pub hop_departed: SimTime,

    /// Instant the current hop completes.  Equals `hop_departed` when
    /// stationary.
    pub hop_arrival: SimTime,
}

impl MovementState {
    /// Construct a stationary state at `wp` at time `now`.
    #[inline]
    pub fn stationary(wp: WaypointId, now: SimTime) -> Self {
        Self {
            in_transit:   false,
            from:         wp,
            hop_to:       wp,
            target:       wp,
            hop_departed: now,
            hop_arrival:  now,
        }
    }

    /// Begin a hop `from → hop_to` (one edge of the path to `target`).
    #[inline]
    pub fn begin_hop(&mut self, hop_to: WaypointId, target: WaypointId, now: SimTime, secs: f64) {
        self.in_transit = true;
        self.hop_to = hop_to;
        self.target = target;
        self.hop_departed = now;
        self.hop_arrival = now.offset(secs);
    }

    /// Complete the in-flight hop: the agent now occupies `hop_to`.
    #[inline]
    pub fn complete_hop(&mut self, now: SimTime) -> WaypointId {
        self.in_transit = false;
        self.from = self.hop_to;
        self.hop_departed = now;
        self.hop_arrival = now;
        self.from
    }

    /// Break off the current hop: the agent stays at `from` (teleport model
    /// means it never left) and the leg is cancelled.
    #[inline]
    pub fn cancel(&mut self, now: SimTime) {
        self.in_transit = false;
        self.hop_to = self.from;
        self.target = self.from;
        self.hop_departed = now;
        self.hop_arrival = now;
    }

    /// `true` once the agent stands at `wp` with no hop in flight.
    #[inline]
    pub fn is_at(&self, wp: WaypointId) -> bool {
        !self.in_transit && self.from == wp
    }

    /// Time of the next movement event, or `NEVER` when stationary.
    #[inline]
    pub fn next_event(&self) -> SimTime {
        if self.in_transit { self.hop_arrival } else { SimTime::NEVER }
    }
}
