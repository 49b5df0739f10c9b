//! Simulation observer trait for progress reporting and data collection.

use rmfs_agent::Fleet;
use rmfs_core::{MateId, OrderId, SimTime, StationId, WaypointId};

/// Callbacks invoked by [`Controller::run`][crate::Controller::run] at key
/// points of the event loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Statistics live in `AgentStats` and
/// the order book; the observer is how they leave the simulation.
pub trait SimObserver {
    /// An update pass begins at `now`.
    fn on_pass_start(&mut self, _now: SimTime) {}

    /// The update pass at `now` reached its fixpoint.
    fn on_pass_end(&mut self, _now: SimTime) {}

    /// A station served every position of `order`.
    fn on_order_completed(&mut self, _order: OrderId, _station: StationId, _now: SimTime) {}

    /// Robot and mate met at `location`; the pick is underway.
    fn on_assist_started(
        &mut self,
        _station: StationId,
        _mate: MateId,
        _location: WaypointId,
        _now: SimTime,
    ) {
    }

    /// The pick at `location` finished.
    fn on_assist_ended(
        &mut self,
        _station: StationId,
        _mate: MateId,
        _location: WaypointId,
        _now: SimTime,
    ) {
    }

    /// The run is over; final agent state is available for collection.
    fn on_sim_end(&mut self, _now: SimTime, _fleet: &Fleet) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run`
/// but don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
