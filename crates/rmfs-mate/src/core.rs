//! Shared matching machinery behind both scheduling strategies.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use rmfs_agent::{StationState, Tasked};
use rmfs_core::{ActorId, MateId, SimConfig, SimTime, StationId, WaypointId};
use rmfs_task::{State, Task};

use crate::ctx::MateCtx;
use crate::request::{ActiveAssist, AssistEvent, AssistRequest};
use crate::{MateError, MateResult};

/// Request registry, active-assist tracking, and the switching arithmetic.
///
/// Strategy types own one of these and differ only in steal eligibility and
/// in what happens to the mate when an assist ends (release vs. chain).
pub struct SchedulerCore {
    /// One request per station needing assistance.  `BTreeMap` keeps every
    /// scan deterministic for a fixed seed.
    requests: BTreeMap<StationId, AssistRequest>,

    /// Assists currently underway.
    active: Vec<ActiveAssist>,

    /// Per-mate history of assist aisle depths (waypoint rows), recorded at
    /// every assist end.
    depth_history: FxHashMap<MateId, Vec<u32>>,

    switching_threshold: f64,
    max_switches: u32,
    reserve_same: bool,
    reserve_next: bool,
    same_location_pref: bool,
    allow_steal: bool,
}

impl SchedulerCore {
    pub fn new(config: &SimConfig, allow_steal: bool) -> Self {
        Self {
            requests: BTreeMap::new(),
            active: Vec::new(),
            depth_history: FxHashMap::default(),
            switching_threshold: config.mate_switching_threshold,
            max_switches: config.max_mate_switches,
            reserve_same: config.reserve_same_assist_location,
            reserve_next: config.reserve_next_assist_location,
            same_location_pref: config.same_assist_location,
            allow_steal,
        }
    }

    // ── Request registration ──────────────────────────────────────────────

    /// Register or refresh a robot's predicted arrival at its next assist
    /// point, then reconsider the matching for that request.
    pub fn update_arrival_time(
        &mut self,
        station: StationId,
        location: WaypointId,
        eta: SimTime,
        ctx: &mut MateCtx<'_>,
    ) -> MateResult<()> {
        let prior = self
            .requests
            .get(&station)
            .map(|r| (r.location, r.covered_by, r.started));

        match prior {
            // Too late to move anything once the pick is underway.
            Some((_, _, true)) => return Ok(()),

            Some((old_loc, covered, false)) => {
                if let Some(req) = self.requests.get_mut(&station) {
                    req.robot_eta = eta;
                    req.location = location;
                }
                if old_loc != location {
                    // The reservation for the abandoned point goes back.
                    if ctx.ledger.lock_holder(old_loc) == Some(ActorId::Station(station)) {
                        ctx.ledger.free_position(old_loc);
                    }
                    if let Some(mate) = covered {
                        // Walk the covering mate to the new point; the pair
                        // is unchanged so this is not a switch.
                        self.cover(station, mate, ctx)?;
                    }
                }
            }

            None => {
                self.requests.insert(
                    station,
                    AssistRequest {
                        station,
                        location,
                        robot_eta: eta,
                        covered_by: None,
                        switches: 0,
                        started: false,
                    },
                );
            }
        }

        self.rematch_request(station, ctx)
    }

    /// Tear down the request of a station whose task was replaced.
    ///
    /// Any active assist dissolves, the covering mate goes idle, and a
    /// reservation still held for the pair is returned.
    pub fn cancel_request(&mut self, station: StationId, ctx: &mut MateCtx<'_>) {
        self.active.retain(|a| a.station != station);
        if let Some(req) = self.requests.remove(&station) {
            if ctx.ledger.lock_holder(req.location) == Some(ActorId::Station(station)) {
                ctx.ledger.free_position(req.location);
            }
            if let Some(mate) = req.covered_by {
                self.release_mate(mate, ctx);
            }
        }
    }

    /// A mate's task was forcibly replaced by someone else.  Drop its cover
    /// and any assist it was mid-way through so it is consistently idle.
    pub fn notify_mate_aborting(&mut self, mate: MateId, ctx: &mut MateCtx<'_>) {
        ctx.mates[mate.index()].current_assist = None;
        self.active.retain(|a| a.mate != mate);
        for req in self.requests.values_mut() {
            if req.covered_by == Some(mate) {
                req.covered_by = None;
                req.started = false;
            }
        }
    }

    // ── Matching ──────────────────────────────────────────────────────────

    /// Reconsider who covers `station`'s request.
    ///
    /// A covered request switches mates only when the candidate beats the
    /// current cover's predicted arrival by at least the switching
    /// threshold, and never more than `max_switches` times.  An uncovered
    /// request takes the best idle mate, or (when the strategy allows)
    /// steals a mate for whom this location is cheaper by the threshold.
    pub fn rematch_request(&mut self, station: StationId, ctx: &mut MateCtx<'_>) -> MateResult<()> {
        let Some(req) = self.requests.get(&station) else {
            return Ok(());
        };
        if req.started {
            return Ok(());
        }
        let loc = req.location;
        let covered = req.covered_by;
        let switches = req.switches;

        match covered {
            Some(current) => {
                if switches >= self.max_switches {
                    return Ok(());
                }
                // A mate already standing at the point is never switched away.
                if self.same_location_pref && ctx.mates[current.index()].movement.is_at(loc) {
                    return Ok(());
                }
                let current_eta = self.mate_eta(current, loc, ctx);
                if let Some((candidate, candidate_eta)) = self.best_idle_candidate(loc, ctx) {
                    if current_eta.0 - candidate_eta.0 >= self.switching_threshold {
                        debug!(
                            %station, from = %current, to = %candidate,
                            saved = current_eta.0 - candidate_eta.0,
                            "switching assist cover"
                        );
                        self.release_mate(current, ctx);
                        self.cover(station, candidate, ctx)?;
                        if let Some(req) = self.requests.get_mut(&station) {
                            req.switches += 1;
                        }
                    }
                }
            }
            None => {
                if let Some((candidate, _)) = self.best_idle_candidate(loc, ctx) {
                    self.cover(station, candidate, ctx)?;
                } else if self.allow_steal {
                    self.try_steal_for(station, loc, ctx)?;
                }
            }
        }
        Ok(())
    }

    /// Re-run matching for every uncovered request, earliest feasible robot
    /// first.
    pub fn rematch_uncovered(&mut self, ctx: &mut MateCtx<'_>) -> MateResult<()> {
        let mut uncovered: Vec<(SimTime, StationId)> = self
            .requests
            .values()
            .filter(|r| r.covered_by.is_none() && !r.started)
            .map(|r| (r.robot_eta, r.station))
            .collect();
        uncovered.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        for (_, station) in uncovered {
            self.rematch_request(station, ctx)?;
        }
        Ok(())
    }

    /// Take a mate away from another not-yet-started request when this
    /// location is cheaper for it by at least the threshold.  The losing
    /// request pays the switch and retries from the idle pool.
    fn try_steal_for(
        &mut self,
        station: StationId,
        loc: WaypointId,
        ctx: &mut MateCtx<'_>,
    ) -> MateResult<()> {
        let mut best: Option<(MateId, StationId, f64)> = None;
        for (&other_station, other) in &self.requests {
            if other_station == station || other.started {
                continue;
            }
            if other.switches >= self.max_switches {
                continue;
            }
            let Some(mate) = other.covered_by else {
                continue;
            };
            let current = self.mate_eta(mate, other.location, ctx);
            let proposed = self.mate_eta(mate, loc, ctx);
            if current.is_never() || proposed.is_never() {
                continue;
            }
            let gain = current.0 - proposed.0;
            if gain >= self.switching_threshold
                && best.map_or(true, |(_, _, g)| gain > g)
            {
                best = Some((mate, other_station, gain));
            }
        }

        if let Some((mate, victim, gain)) = best {
            debug!(%station, %mate, from = %victim, saved = gain, "stealing assist cover");
            self.release_mate(mate, ctx);
            if let Some(v) = self.requests.get_mut(&victim) {
                v.covered_by = None;
                v.switches += 1;
            }
            self.cover(station, mate, ctx)?;
            // The victim retries from the idle pool only; stealing back
            // immediately would ping-pong.
            let victim_loc = self.requests.get(&victim).map(|r| r.location);
            if let Some(victim_loc) = victim_loc {
                if let Some((candidate, _)) = self.best_idle_candidate(victim_loc, ctx) {
                    self.cover(victim, candidate, ctx)?;
                }
            }
        }
        Ok(())
    }

    /// Bind `mate` to `station`'s request: task the mate with the walk and
    /// the pick, and take the configured reservations.
    pub fn cover(&mut self, station: StationId, mate: MateId, ctx: &mut MateCtx<'_>) -> MateResult<()> {
        let loc = {
            let req = self
                .requests
                .get_mut(&station)
                .ok_or(MateError::UnknownRequest(station))?;
            req.covered_by = Some(mate);
            req.location
        };

        let m = &mut ctx.mates[mate.index()];
        m.assign_task(Task::Assist { station, at: loc }, ctx.ledger);
        m.queue.extend([
            State::Move { to: loc },
            State::PerformAssist { station, at: loc },
        ]);
        m.current_assist = Some(station);

        let holder = ActorId::Station(station);
        if self.reserve_same {
            if ctx.ledger.lock_holder(loc) != Some(holder) {
                ctx.ledger.lock_position(loc, holder)?;
            }
            ctx.stations[station.index()].queue.mark_rendezvous_locked(loc);
        }
        if self.reserve_next {
            if let Some(next) = ctx.stations[station.index()].queue.location_after(1) {
                if ctx.ledger.lock_holder(next) != Some(holder) {
                    ctx.ledger.lock_position(next, holder)?;
                }
                ctx.stations[station.index()].queue.mark_rendezvous_locked(next);
            }
        }
        Ok(())
    }

    /// Idle the mate: no cover, no task, claims returned.
    pub fn release_mate(&mut self, mate: MateId, ctx: &mut MateCtx<'_>) {
        let m = &mut ctx.mates[mate.index()];
        m.current_assist = None;
        m.assign_task(Task::None, ctx.ledger);
    }

    // ── Assist lifecycle ──────────────────────────────────────────────────

    /// Start every assist whose robot and mate are both parked at the
    /// rendezvous with the matching head states.
    pub fn start_ready(&mut self, ctx: &mut MateCtx<'_>) -> Vec<AssistEvent> {
        let mut ready: Vec<(StationId, MateId, WaypointId)> = Vec::new();
        for (&sid, req) in &self.requests {
            if req.started {
                continue;
            }
            let Some(mate) = req.covered_by else {
                continue;
            };
            let s = &ctx.stations[sid.index()];
            let robot_waiting = matches!(
                s.queue.front(),
                Some(State::WaitingForMate { at, .. } | State::WaitingForSeeOff { at, .. })
                    if *at == req.location
            );
            let m = &ctx.mates[mate.index()];
            let mate_ready = matches!(
                m.queue.front(),
                Some(State::PerformAssist { at, .. }) if *at == req.location
            );
            if robot_waiting
                && s.movement.is_at(req.location)
                && mate_ready
                && m.movement.is_at(req.location)
            {
                ready.push((sid, mate, req.location));
            }
        }

        let mut events = Vec::with_capacity(ready.len());
        for (station, mate, location) in ready {
            let ends = self.notify_assist_started(station, mate, location, ctx);
            events.push(AssistEvent::Started { station, mate, location, ends });
        }
        events
    }

    /// Lifecycle hook: robot and mate have met; the pick is underway.
    pub fn notify_assist_started(
        &mut self,
        station: StationId,
        mate: MateId,
        location: WaypointId,
        ctx: &mut MateCtx<'_>,
    ) -> SimTime {
        let duration = assist_duration(&ctx.stations[station.index()], location, ctx.config);
        let ends = ctx.now.offset(duration);
        if let Some(req) = self.requests.get_mut(&station) {
            req.started = true;
            req.switches = 0;
        }
        ctx.stations[station.index()].stats.assists += 1;
        ctx.mates[mate.index()].stats.assists += 1;
        self.active.push(ActiveAssist { station, mate, location, ends });
        debug!(%station, %mate, %location, %ends, "assist started");
        ends
    }

    /// Complete every assist whose end instant has been reached.
    ///
    /// `chain` selects the see-off behavior: the mate follows its robot to
    /// the next rendezvous instead of being released.
    pub fn complete_due(&mut self, ctx: &mut MateCtx<'_>, chain: bool) -> MateResult<Vec<AssistEvent>> {
        let mut due = Vec::new();
        let mut keep = Vec::new();
        for assist in self.active.drain(..) {
            if assist.ends <= ctx.now {
                due.push(assist);
            } else {
                keep.push(assist);
            }
        }
        self.active = keep;

        let mut events = Vec::with_capacity(due.len());
        for assist in due {
            self.notify_assist_ended(&assist, ctx, chain)?;
            events.push(AssistEvent::Ended {
                station: assist.station,
                mate: assist.mate,
                location: assist.location,
            });
        }
        Ok(events)
    }

    /// Lifecycle hook: the pick at the rendezvous finished.
    ///
    /// Pops the waiting/assist head states, returns the pair's reservation,
    /// records the assist depth, and retires the request.  The mate is then
    /// released or chained per `chain`.
    pub fn notify_assist_ended(
        &mut self,
        assist: &ActiveAssist,
        ctx: &mut MateCtx<'_>,
        chain: bool,
    ) -> MateResult<()> {
        let s = &mut ctx.stations[assist.station.index()];
        if matches!(
            s.queue.front(),
            Some(State::WaitingForMate { .. } | State::WaitingForSeeOff { .. })
        ) {
            if let Some(done) = s.queue.pop_front() {
                s.last_completed = Some(done.kind());
            }
        }
        s.stats.picks += 1;

        let m = &mut ctx.mates[assist.mate.index()];
        if matches!(m.queue.front(), Some(State::PerformAssist { .. })) {
            if let Some(done) = m.queue.pop_front() {
                m.last_completed = Some(done.kind());
            }
        }

        if ctx.ledger.lock_holder(assist.location) == Some(ActorId::Station(assist.station)) {
            ctx.ledger.free_position(assist.location);
        }
        self.save_last_assist_depth(assist.mate, ctx.graph.waypoints[assist.location.index()].row);
        self.requests.remove(&assist.station);
        debug!(station = %assist.station, mate = %assist.mate, "assist ended");

        if chain {
            // See-off: stay with the robot through its next rendezvous.
            match ctx.stations[assist.station.index()].queue.location_after(0) {
                Some(next) => {
                    let s = &ctx.stations[assist.station.index()];
                    let eta = ctx.oracle.predict_arrival(
                        ctx.graph,
                        s.movement.from,
                        next,
                        s.speed_mps,
                        ctx.now,
                    );
                    self.requests.insert(
                        assist.station,
                        AssistRequest {
                            station: assist.station,
                            location: next,
                            robot_eta: eta,
                            covered_by: Some(assist.mate),
                            switches: 0,
                            started: false,
                        },
                    );
                    self.cover(assist.station, assist.mate, ctx)?;
                }
                None => self.release_mate(assist.mate, ctx),
            }
        } else {
            self.release_mate(assist.mate, ctx);
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn request_for(&self, station: StationId) -> Option<&AssistRequest> {
        self.requests.get(&station)
    }

    pub fn active_assists(&self) -> &[ActiveAssist] {
        &self.active
    }

    /// Earliest pending assist completion, or `NEVER`.
    pub fn next_event_time(&self) -> SimTime {
        self.active
            .iter()
            .fold(SimTime::NEVER, |acc, a| acc.min(a.ends))
    }

    /// Recorded assist depths (waypoint rows) for `mate`, oldest first.
    pub fn assist_depths(&self, mate: MateId) -> &[u32] {
        self.depth_history.get(&mate).map_or(&[], Vec::as_slice)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn save_last_assist_depth(&mut self, mate: MateId, depth: u32) {
        self.depth_history.entry(mate).or_default().push(depth);
    }

    /// Predicted arrival of `mate` at `loc` from its current position.
    fn mate_eta(&self, mate: MateId, loc: WaypointId, ctx: &MateCtx<'_>) -> SimTime {
        let m = &ctx.mates[mate.index()];
        ctx.oracle
            .predict_arrival(ctx.graph, m.movement.from, loc, m.speed_mps, ctx.now)
    }

    /// Cheapest idle (unassigned, resting or task-less) mate for `loc`.
    fn best_idle_candidate(&self, loc: WaypointId, ctx: &MateCtx<'_>) -> Option<(MateId, SimTime)> {
        let mut best: Option<(MateId, SimTime)> = None;
        for m in ctx.mates.iter() {
            if m.current_assist.is_some() {
                continue;
            }
            if !(m.task.is_none() || m.task.is_rest()) {
                continue;
            }
            if self.same_location_pref && m.movement.is_at(loc) {
                return Some((m.id, ctx.now));
            }
            let eta = ctx
                .oracle
                .predict_arrival(ctx.graph, m.movement.from, loc, m.speed_mps, ctx.now);
            if eta.is_never() {
                continue;
            }
            if best.is_none_or(|(_, b)| eta < b) {
                best = Some((m.id, eta));
            }
        }
        best
    }
}

/// Service duration of the pick at `loc` for the station's active gather.
fn assist_duration(station: &StationState, loc: WaypointId, config: &SimConfig) -> f64 {
    match &station.task {
        Task::MultiPointGather(g) => g
            .stops
            .iter()
            .find(|s| s.location == loc)
            .map(|s| s.service_secs)
            .unwrap_or(config.pallet_service_secs),
        _ => config.pallet_service_secs,
    }
}
