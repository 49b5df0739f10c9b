//! Simulation time model.
//!
//! # Design
//!
//! The simulation advances through discrete *events*, not fixed time steps:
//! the controller asks every agent and manager for the time of its next
//! pending event, jumps the clock to the minimum, and runs one update pass.
//! Event times are therefore continuous seconds (`f64`) rather than integer
//! ticks — travel legs, service windows, and mate arrival predictions all
//! produce fractional instants, and comparing them exactly is what drives
//! the loop.
//!
//! `SimTime::NEVER` (positive infinity) means "no pending event".  An agent
//! parked in a waiting state reports `NEVER`; it is re-activated by an
//! external notification, never by the clock.

use std::fmt;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation instant, in seconds since the start of the run.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// "No pending event" sentinel.  Greater than every real instant.
    pub const NEVER: SimTime = SimTime(f64::INFINITY);

    /// The instant `secs` seconds after `self`.
    #[inline]
    pub fn offset(self, secs: f64) -> SimTime {
        SimTime(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self` (clamped at zero).
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    /// The earlier of two instants.  `NEVER` loses to any real instant.
    #[inline]
    pub fn min(self, other: SimTime) -> SimTime {
        if other.0 < self.0 { other } else { self }
    }

    /// `true` if this is the `NEVER` sentinel.
    #[inline]
    pub fn is_never(self) -> bool {
        self.0.is_infinite()
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            write!(f, "t=never")
        } else {
            write!(f, "t={:.3}s", self.0)
        }
    }
}

// ── EventClock ────────────────────────────────────────────────────────────────

/// Monotonic event clock driven by the controller.
///
/// The clock only ever moves forward; `advance_to` with an earlier instant is
/// a coordination bug and trips a debug assertion.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventClock {
    now: SimTime,
}

impl EventClock {
    pub fn new() -> Self {
        Self { now: SimTime::ZERO }
    }

    /// The current simulation instant.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Jump the clock to `t`.
    ///
    /// # Panics
    /// Panics in debug mode if `t` is earlier than the current instant or is
    /// the `NEVER` sentinel.
    #[inline]
    pub fn advance_to(&mut self, t: SimTime) {
        debug_assert!(!t.is_never(), "cannot advance the clock to NEVER");
        debug_assert!(t.0 >= self.now.0, "clock moved backwards: {} -> {}", self.now, t);
        self.now = t;
    }
}

impl Default for EventClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.now)
    }
}
