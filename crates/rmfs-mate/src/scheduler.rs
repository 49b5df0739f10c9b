//! The scheduling-strategy contract and its two implementations.

use rmfs_core::{MateId, SimTime, StationId, WaypointId};

use crate::core::SchedulerCore;
use crate::ctx::MateCtx;
use crate::request::{AssistEvent, AssistRequest};
use crate::MateResult;

// ── MateScheduling ────────────────────────────────────────────────────────────

/// Event contract between the controller and a mate-scheduling strategy.
///
/// Both strategies implement exactly this surface; the controller holds a
/// `Box<dyn MateScheduling>` chosen from configuration and never knows
/// which one it drives.
pub trait MateScheduling {
    /// A robot's path to its next assist point changed; register the new
    /// prediction and reconsider the matching.
    fn update_arrival_time(
        &mut self,
        station: StationId,
        location: WaypointId,
        eta: SimTime,
        ctx: &mut MateCtx<'_>,
    ) -> MateResult<()>;

    /// A mate's task was forcibly replaced; leave it consistently idle.
    fn notify_mate_aborting(&mut self, mate: MateId, ctx: &mut MateCtx<'_>);

    /// A station's task was replaced; retire its request and free its mate.
    fn cancel_request(&mut self, station: StationId, ctx: &mut MateCtx<'_>);

    /// Advance assist lifecycles for the current instant: complete due
    /// assists, re-match uncovered requests, start ready assists.
    fn tick(&mut self, ctx: &mut MateCtx<'_>) -> MateResult<Vec<AssistEvent>>;

    /// Earliest instant this scheduler needs the controller to act, or
    /// `NEVER`.
    fn next_event_time(&self) -> SimTime;

    /// The pending request of `station`, if any.
    fn request_for(&self, station: StationId) -> Option<&AssistRequest>;
}

// ── EarliestFeasible ──────────────────────────────────────────────────────────

/// Default strategy: a freed mate immediately moves to the uncovered
/// request it can serve soonest, and covers may be stolen between
/// not-yet-started requests when the threshold is met.
pub struct EarliestFeasible {
    core: SchedulerCore,
}

impl EarliestFeasible {
    pub fn new(config: &rmfs_core::SimConfig) -> Self {
        Self { core: SchedulerCore::new(config, true) }
    }

    pub fn core(&self) -> &SchedulerCore {
        &self.core
    }
}

impl MateScheduling for EarliestFeasible {
    fn update_arrival_time(
        &mut self,
        station: StationId,
        location: WaypointId,
        eta: SimTime,
        ctx: &mut MateCtx<'_>,
    ) -> MateResult<()> {
        self.core.update_arrival_time(station, location, eta, ctx)
    }

    fn notify_mate_aborting(&mut self, mate: MateId, ctx: &mut MateCtx<'_>) {
        self.core.notify_mate_aborting(mate, ctx);
    }

    fn cancel_request(&mut self, station: StationId, ctx: &mut MateCtx<'_>) {
        self.core.cancel_request(station, ctx);
    }

    fn tick(&mut self, ctx: &mut MateCtx<'_>) -> MateResult<Vec<AssistEvent>> {
        let mut events = self.core.complete_due(ctx, false)?;
        self.core.rematch_uncovered(ctx)?;
        events.extend(self.core.start_ready(ctx));
        Ok(events)
    }

    fn next_event_time(&self) -> SimTime {
        self.core.next_event_time()
    }

    fn request_for(&self, station: StationId) -> Option<&AssistRequest> {
        self.core.request_for(station)
    }
}

// ── SeeOff ────────────────────────────────────────────────────────────────────

/// See-off strategy: a mate walks its robot through consecutive rendezvous
/// points and is released only when the chain ends.  Covers are never
/// stolen — the pairing is the point.
pub struct SeeOff {
    core: SchedulerCore,
}

impl SeeOff {
    pub fn new(config: &rmfs_core::SimConfig) -> Self {
        Self { core: SchedulerCore::new(config, false) }
    }

    pub fn core(&self) -> &SchedulerCore {
        &self.core
    }
}

impl MateScheduling for SeeOff {
    fn update_arrival_time(
        &mut self,
        station: StationId,
        location: WaypointId,
        eta: SimTime,
        ctx: &mut MateCtx<'_>,
    ) -> MateResult<()> {
        self.core.update_arrival_time(station, location, eta, ctx)
    }

    fn notify_mate_aborting(&mut self, mate: MateId, ctx: &mut MateCtx<'_>) {
        self.core.notify_mate_aborting(mate, ctx);
    }

    fn cancel_request(&mut self, station: StationId, ctx: &mut MateCtx<'_>) {
        self.core.cancel_request(station, ctx);
    }

    fn tick(&mut self, ctx: &mut MateCtx<'_>) -> MateResult<Vec<AssistEvent>> {
        let mut events = self.core.complete_due(ctx, true)?;
        self.core.rematch_uncovered(ctx)?;
        events.extend(self.core.start_ready(ctx));
        Ok(events)
    }

    fn next_event_time(&self) -> SimTime {
        self.core.next_event_time()
    }

    fn request_for(&self, station: StationId) -> Option<&AssistRequest> {
        self.core.request_for(station)
    }
}
