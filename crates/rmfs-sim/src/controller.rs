//! The `Controller` struct and its event loop.

use tracing::{debug, info, warn};

use rmfs_agent::{Fleet, MateState, StationState, Tasked};
use rmfs_alloc::{AllocCtx, TaskAllocator};
use rmfs_core::{
    EventClock, MateId, OrderId, SimConfig, SimRng, SimTime, StationId, WaypointId,
};
use rmfs_layout::{PalletStands, PathOracle, WaypointGraph};
use rmfs_ledger::ResourceLedger;
use rmfs_mate::{AssistEvent, MateCtx, MateScheduling};
use rmfs_order::{BatchingPolicy, OrderBook, OrderLine};
use rmfs_task::{State, StateKind, Task};

use crate::{SimObserver, SimResult};

/// Hard bound on zero-duration cascades within one update pass.  A pass
/// that does not reach its fixpoint in this many iterations has a cyclic
/// zero-time transition, which is a coordination bug.
const PASS_FIXPOINT_BOUND: usize = 10_000;

// ── Controller ────────────────────────────────────────────────────────────────

/// The discrete-event driver.
///
/// Owns all simulation state and advances it event by event: the clock
/// jumps to the earliest pending event (hop arrival, service completion,
/// assist completion), then one update pass runs every manager in fixed
/// dependency order so that decisions made early in the pass are visible to
/// the agents reacting later in the same pass.
///
/// Create via [`ControllerBuilder`][crate::ControllerBuilder].
pub struct Controller<R: PathOracle> {
    pub config: SimConfig,
    pub clock: EventClock,
    pub graph: WaypointGraph,
    pub stands: PalletStands,
    pub ledger: ResourceLedger,
    pub fleet: Fleet,
    pub book: OrderBook,
    pub oracle: R,

    pub(crate) policy: Box<dyn BatchingPolicy>,
    pub(crate) allocator: TaskAllocator,
    pub(crate) scheduler: Box<dyn MateScheduling>,
    pub(crate) rng: SimRng,

    pub(crate) last_update: SimTime,
    pub(crate) stopped: bool,
}

impl<R: PathOracle> Controller<R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current instant until the configured duration elapses,
    /// [`stop`][Self::stop] is called, or no events remain.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        // Decisions at t = 0 before the first jump.
        self.update(observer)?;

        while !self.stopped {
            let next = self.next_event_time();
            if next.is_never() || next.0 > self.config.duration_secs {
                break;
            }
            self.clock.advance_to(next);
            self.update(observer)?;
        }

        // Drain the remaining horizon so idle/wait statistics cover the
        // whole configured duration even when no events remain.
        let horizon = SimTime(self.config.duration_secs);
        if !self.stopped && self.clock.now() < horizon {
            self.clock.advance_to(horizon);
            let dt = horizon.since(self.last_update);
            if dt > 0.0 {
                self.accrue_stats(dt);
            }
            self.last_update = horizon;
        }

        observer.on_sim_end(self.clock.now(), &self.fleet);
        Ok(())
    }

    /// Process the pass at the current instant plus at most `n` event
    /// jumps.  Useful for tests and incremental stepping.
    pub fn run_events<O: SimObserver>(&mut self, n: usize, observer: &mut O) -> SimResult<()> {
        self.update(observer)?;
        for _ in 0..n {
            if self.stopped {
                break;
            }
            let next = self.next_event_time();
            if next.is_never() || next.0 > self.config.duration_secs {
                break;
            }
            self.clock.advance_to(next);
            self.update(observer)?;
        }
        Ok(())
    }

    /// Signal the run to end after the current pass.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Enter a new pending order.
    pub fn submit_order(&mut self, lines: Vec<OrderLine>, deadline: Option<SimTime>) -> OrderId {
        self.book.submit(lines, self.clock.now(), deadline)
    }

    /// Forcibly replace a station's task: break off, move to `safe`, and
    /// hold there until re-tasked.  The discarded plan's claims are
    /// released within the same pass, and the station's assist request is
    /// retired.
    pub fn abort_task(&mut self, station: StationId, safe: WaypointId) -> SimResult<()> {
        let now = self.clock.now();
        {
            let Controller { config, graph, oracle, ledger, fleet, scheduler, .. } = self;
            let mut ctx = mate_ctx(now, config, graph, &*oracle, ledger, fleet);
            scheduler.cancel_request(station, &mut ctx);
        }
        let s = self.fleet.station_mut(station)?;
        s.assign_task(Task::Aborting, &mut self.ledger);
        s.service_until = SimTime::NEVER;
        s.queue.push_back(State::AbortMoveToAndWait { at: safe });
        debug!(%station, %safe, "station task aborted");
        Ok(())
    }

    /// Forcibly idle a mate.  The scheduler is informed first so its
    /// request bookkeeping never sees the mate mid-assist.
    pub fn abort_mate_task(&mut self, mate: MateId) -> SimResult<()> {
        let now = self.clock.now();
        {
            let Controller { config, graph, oracle, ledger, fleet, scheduler, .. } = self;
            let mut ctx = mate_ctx(now, config, graph, &*oracle, ledger, fleet);
            scheduler.notify_mate_aborting(mate, &mut ctx);
        }
        let m = self.fleet.mate_mut(mate)?;
        m.assign_task(Task::None, &mut self.ledger);
        Ok(())
    }

    /// Earliest pending event across all agents and managers, or `NEVER`.
    pub fn next_event_time(&self) -> SimTime {
        let mut t = self.scheduler.next_event_time();
        for s in &self.fleet.stations {
            t = t.min(s.movement.next_event()).min(s.service_until);
        }
        for m in &self.fleet.mates {
            t = t.min(m.movement.next_event());
        }
        t
    }

    // ── Update pass ───────────────────────────────────────────────────────

    /// One update pass at the current instant, run to fixpoint.
    fn update<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.now();
        observer.on_pass_start(now);

        let dt = now.since(self.last_update);
        if dt > 0.0 {
            self.accrue_stats(dt);
        }

        // Order batching first: bindings made here are visible to task
        // allocation below, within the same pass.
        self.policy.signal_current_time(now);
        self.policy
            .decide_about_pending_orders(&mut self.book, &mut self.fleet.stations, &self.graph)?;

        // Cascade zero-duration consequences until the pass settles.
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > PASS_FIXPOINT_BOUND {
                warn!(%now, "update pass did not reach fixpoint; breaking");
                debug_assert!(false, "cyclic zero-time transition");
                break;
            }

            let mut progressed = self.allocate_idle()?;
            progressed |= self.scheduler_tick(observer)?;

            let (moved, updates, completions) = self.advance_agents(now)?;
            progressed |= moved;
            progressed |= self.apply_completions(completions, observer, now)?;
            if !updates.is_empty() {
                self.flush_arrival_updates(updates)?;
                progressed = true;
            }

            if !progressed {
                break;
            }
        }

        observer.on_pass_end(now);
        self.last_update = now;
        Ok(())
    }

    /// Statistics accrual for the interval since the previous pass, keyed
    /// by what each agent was doing across it.
    fn accrue_stats(&mut self, dt: f64) {
        for s in &mut self.fleet.stations {
            if s.movement.in_transit {
                s.stats.travel_secs += dt;
            } else {
                match s.queue.front().map(State::kind) {
                    Some(StateKind::WaitingForMate | StateKind::WaitingForSeeOff) => {
                        s.stats.wait_secs += dt
                    }
                    Some(StateKind::Rest) | None => s.stats.idle_secs += dt,
                    _ => {}
                }
            }
        }
        for m in &mut self.fleet.mates {
            if m.movement.in_transit {
                m.stats.travel_secs += dt;
            } else {
                match m.queue.front().map(State::kind) {
                    Some(StateKind::Rest) | None => m.stats.idle_secs += dt,
                    _ => {}
                }
            }
        }
    }

    /// Hand every drained agent to the allocator.  Stations resting on a
    /// fresh order binding and stations parked after an abort also count as
    /// needing work.
    fn allocate_idle(&mut self) -> SimResult<bool> {
        let now = self.clock.now();
        let mut progressed = false;

        for idx in 0..self.fleet.stations.len() {
            let id = self.fleet.stations[idx].id;
            let (needs, replacing_plan) = {
                let s = &self.fleet.stations[idx];
                let drained = s.queue.is_empty();
                let resting_with_work =
                    s.task.is_rest() && station_has_open_order(s, &self.book);
                let parked_abort = matches!(s.task, Task::Aborting)
                    && matches!(
                        s.queue.front(),
                        Some(State::AbortMoveToAndWait { at }) if s.movement.is_at(*at)
                    );
                (drained || resting_with_work || parked_abort, !s.queue.is_empty())
            };
            if !needs {
                continue;
            }
            if replacing_plan {
                // The current plan dies with its assist request.
                let Controller { config, graph, oracle, ledger, fleet, scheduler, .. } = self;
                let mut ctx = mate_ctx(now, config, graph, &*oracle, ledger, fleet);
                scheduler.cancel_request(id, &mut ctx);
            }
            let assigned = {
                let Controller {
                    config, graph, stands, oracle, ledger, rng, allocator, fleet, book, ..
                } = self;
                let mut ctx = AllocCtx {
                    now,
                    config,
                    graph,
                    stands,
                    oracle: &*oracle,
                    ledger,
                    rng,
                };
                allocator.next_station_task(&mut fleet.stations[idx], book, &mut ctx)?
            };
            progressed |= assigned;
        }

        for idx in 0..self.fleet.mates.len() {
            let needs = {
                let m = &self.fleet.mates[idx];
                m.queue.is_empty() && m.current_assist.is_none()
            };
            if !needs {
                continue;
            }
            let assigned = {
                let Controller {
                    config, graph, stands, oracle, ledger, rng, allocator, fleet, ..
                } = self;
                let mut ctx = AllocCtx {
                    now,
                    config,
                    graph,
                    stands,
                    oracle: &*oracle,
                    ledger,
                    rng,
                };
                allocator.send_mate_to_rest(&mut fleet.mates[idx], &mut ctx)
            };
            progressed |= assigned;
        }

        Ok(progressed)
    }

    /// Drive the mate scheduler and apply its events.
    fn scheduler_tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<bool> {
        let now = self.clock.now();
        let events = {
            let Controller { config, graph, oracle, ledger, fleet, scheduler, .. } = self;
            let mut ctx = mate_ctx(now, config, graph, &*oracle, ledger, fleet);
            scheduler.tick(&mut ctx)?
        };
        let progressed = !events.is_empty();

        for event in events {
            match event {
                AssistEvent::Started { station, mate, location, .. } => {
                    observer.on_assist_started(station, mate, location, now);
                }
                AssistEvent::Ended { station, mate, location } => {
                    // The pick happened: mark the order line served.
                    let line = {
                        let s = &self.fleet.stations[station.index()];
                        match &s.task {
                            Task::MultiPointGather(g) => g
                                .stops
                                .iter()
                                .find(|st| {
                                    st.location == location && !s.gathered.contains(&st.address)
                                })
                                .map(|st| (g.order, st.address.clone())),
                            _ => None,
                        }
                    };
                    if let Some((order, address)) = line {
                        self.book.mark_line_completed(order, &address)?;
                        self.fleet.stations[station.index()].gathered.push(address);
                    }
                    observer.on_assist_ended(station, mate, location, now);
                }
            }
        }
        Ok(progressed)
    }

    /// Advance movement and service states for every agent.
    #[allow(clippy::type_complexity)]
    fn advance_agents(
        &mut self,
        now: SimTime,
    ) -> SimResult<(bool, Vec<(StationId, WaypointId, SimTime)>, Vec<(OrderId, StationId)>)> {
        let mut progressed = false;
        let mut updates = Vec::new();
        let mut completions = Vec::new();

        let Controller { graph, oracle, ledger, config, book, fleet, .. } = self;

        for idx in 0..fleet.stations.len() {
            let out =
                advance_station(&mut fleet.stations[idx], now, graph, &*oracle, ledger, config, book)?;
            progressed |= out.progressed;
            let sid = fleet.stations[idx].id;
            updates.extend(out.arrival_updates.into_iter().map(|(loc, eta)| (sid, loc, eta)));
            if let Some(order) = out.completed_order {
                completions.push((order, sid));
            }
        }
        for idx in 0..fleet.mates.len() {
            progressed |= advance_mate(&mut fleet.mates[idx], now, graph, &*oracle)?;
        }

        Ok((progressed, updates, completions))
    }

    /// Retire fully delivered orders.
    fn apply_completions<O: SimObserver>(
        &mut self,
        completions: Vec<(OrderId, StationId)>,
        observer: &mut O,
        now: SimTime,
    ) -> SimResult<bool> {
        let progressed = !completions.is_empty();
        for (order, sid) in completions {
            self.book
                .complete(order, &mut self.fleet.stations[sid.index()], now)?;
            let s = &mut self.fleet.stations[sid.index()];
            s.task = Task::None;
            s.gathered.clear();
            info!(%order, station = %sid, %now, "order delivered");
            observer.on_order_completed(order, sid, now);
        }
        Ok(progressed)
    }

    /// Push collected rendezvous predictions into the mate scheduler.
    fn flush_arrival_updates(
        &mut self,
        updates: Vec<(StationId, WaypointId, SimTime)>,
    ) -> SimResult<()> {
        let now = self.clock.now();
        let Controller { config, graph, oracle, ledger, fleet, scheduler, .. } = self;
        let mut ctx = mate_ctx(now, config, graph, &*oracle, ledger, fleet);
        for (station, location, eta) in updates {
            scheduler.update_arrival_time(station, location, eta, &mut ctx)?;
        }
        Ok(())
    }
}

// ── Context plumbing ──────────────────────────────────────────────────────────

fn mate_ctx<'a>(
    now: SimTime,
    config: &'a SimConfig,
    graph: &'a WaypointGraph,
    oracle: &'a dyn PathOracle,
    ledger: &'a mut ResourceLedger,
    fleet: &'a mut Fleet,
) -> MateCtx<'a> {
    MateCtx {
        now,
        config,
        graph,
        oracle,
        ledger,
        stations: &mut fleet.stations,
        mates: &mut fleet.mates,
    }
}

fn station_has_open_order(station: &StationState, book: &OrderBook) -> bool {
    station
        .capacity
        .assigned
        .iter()
        .any(|&o| book.order(o).map(|o| o.first_open().is_some()).unwrap_or(false))
}

// ── Station advancement ───────────────────────────────────────────────────────

#[derive(Default)]
struct StationOutcome {
    progressed: bool,
    /// Rendezvous predictions to register: `(location, eta)`.
    arrival_updates: Vec<(WaypointId, SimTime)>,
    /// Order fully delivered at an output stand this pass.
    completed_order: Option<OrderId>,
}

enum HopStart {
    Started,
    Blocked,
}

/// Process one station's due transitions at `now` until it blocks on time,
/// a wait, or an empty queue.
fn advance_station(
    s: &mut StationState,
    now: SimTime,
    graph: &WaypointGraph,
    oracle: &dyn PathOracle,
    ledger: &mut ResourceLedger,
    config: &SimConfig,
    book: &mut OrderBook,
) -> SimResult<StationOutcome> {
    let mut out = StationOutcome::default();

    loop {
        // An in-flight hop completes before anything else is considered.
        if s.movement.in_transit {
            if s.movement.hop_arrival > now {
                break;
            }
            let arrived = s.movement.complete_hop(now);
            out.progressed = true;
            let new_zone = graph.waypoints[arrived.index()].zone;
            if s.in_zone != new_zone {
                // Admission was taken when the hop began; only exits are
                // settled here.
                if let Some(old) = s.in_zone {
                    ledger.leave_zone(old);
                }
                s.in_zone = new_zone;
            }
            continue;
        }

        let Some(head) = s.queue.front().cloned() else {
            break;
        };

        match head {
            State::Move { to } => {
                if s.movement.is_at(to) {
                    s.queue.pop_front();
                    s.last_completed = Some(StateKind::Move);
                    out.progressed = true;
                    // Parked at a rendezvous: refresh the prediction to "now".
                    if let Some(
                        State::WaitingForMate { at, .. } | State::WaitingForSeeOff { at, .. },
                    ) = s.queue.front()
                    {
                        if *at == to {
                            out.arrival_updates.push((to, now));
                        }
                    }
                    continue;
                }
                match begin_station_hop(s, to, now, graph, oracle, ledger)? {
                    HopStart::Started => {
                        out.progressed = true;
                        // Heading for a rendezvous: register the predicted
                        // arrival so mates can pre-position.
                        if let Some(
                            State::WaitingForMate { at, .. } | State::WaitingForSeeOff { at, .. },
                        ) = s.queue.peek_second()
                        {
                            if *at == to {
                                let eta = oracle
                                    .predict_arrival(graph, s.movement.from, to, s.speed_mps, now);
                                out.arrival_updates.push((to, eta));
                            }
                        }
                        break;
                    }
                    HopStart::Blocked => break,
                }
            }

            State::AbortMoveToAndWait { at } => {
                if s.movement.is_at(at) {
                    // Holding position until re-tasked.
                    break;
                }
                match begin_station_hop(s, at, now, graph, oracle, ledger)? {
                    HopStart::Started => {
                        out.progressed = true;
                        break;
                    }
                    HopStart::Blocked => break,
                }
            }

            State::ChangeDestination { to } => {
                // Breaking off a hop returns any zone admission taken for it.
                if s.movement.in_transit {
                    let hop_zone = graph.waypoints[s.movement.hop_to.index()].zone;
                    if hop_zone.is_some() && hop_zone != s.in_zone {
                        if let Some(zone) = hop_zone {
                            ledger.leave_zone(zone);
                        }
                    }
                }
                s.movement.cancel(now);
                s.queue.pop_front();
                s.last_completed = Some(StateKind::ChangeDestination);
                match s.queue.front_mut() {
                    Some(State::Move { to: old }) => *old = to,
                    _ => s.queue.push_front(State::Move { to }),
                }
                out.progressed = true;
                continue;
            }

            State::GetPallet { .. }
            | State::PutPallet { .. }
            | State::PickItem { .. }
            | State::PreparePartialTask { .. } => {
                if s.service_until.is_never() {
                    let duration = service_duration(&head, s, config);
                    s.service_until = now.offset(duration);
                    out.progressed = true;
                    if s.service_until > now {
                        break;
                    }
                    continue;
                }
                if s.service_until > now {
                    break;
                }
                // Service complete.
                s.service_until = SimTime::NEVER;
                complete_station_service(&head, s, ledger, book, &mut out)?;
                s.queue.pop_front();
                s.last_completed = Some(head.kind());
                out.progressed = true;
                continue;
            }

            // Waits resolve through the mate scheduler; rest resolves
            // through task replacement.
            State::Rest { .. }
            | State::WaitingForMate { .. }
            | State::WaitingForSeeOff { .. }
            | State::PerformAssist { .. } => break,
        }
    }

    Ok(out)
}

/// Begin the next hop toward `target`, honoring zone admission.
fn begin_station_hop(
    s: &mut StationState,
    target: WaypointId,
    now: SimTime,
    graph: &WaypointGraph,
    oracle: &dyn PathOracle,
    ledger: &mut ResourceLedger,
) -> SimResult<HopStart> {
    let from = s.movement.from;
    let hop = match oracle.next_waypoint(graph, from, target) {
        Ok(hop) => hop,
        Err(e) => {
            // Routing failure is non-fatal: the station holds position and
            // the estimate is retried on a later pass.
            warn!(station = %s.id, %target, error = %e, "no route; holding position");
            return Ok(HopStart::Blocked);
        }
    };
    if hop == from {
        return Ok(HopStart::Blocked);
    }

    // Entry into a protected queue zone is gated by its semaphore.
    let hop_zone = graph.waypoints[hop.index()].zone;
    if let Some(zone) = hop_zone {
        if Some(zone) != s.in_zone && !ledger.try_enter_zone(zone)? {
            return Ok(HopStart::Blocked);
        }
    }

    let secs = match graph.edge_length(from, hop) {
        Some(len) => len as f64 / s.speed_mps,
        None => oracle.travel_secs(graph, from, hop, s.speed_mps)?,
    };
    s.movement.begin_hop(hop, target, now, secs);
    Ok(HopStart::Started)
}

/// Effects of a finished service state.
fn complete_station_service(
    head: &State,
    s: &mut StationState,
    ledger: &mut ResourceLedger,
    book: &mut OrderBook,
    out: &mut StationOutcome,
) -> SimResult<()> {
    match *head {
        State::GetPallet { stand } => {
            s.carrying_pallet = true;
            ledger.clear_inbound(stand);
        }
        State::PutPallet { stand } => {
            s.carrying_pallet = false;
            ledger.clear_inbound(stand);
            if let Task::MultiPointGather(g) = &s.task {
                if book.order(g.order).map(|o| o.is_complete()).unwrap_or(false) {
                    out.completed_order = Some(g.order);
                }
            }
        }
        State::PickItem { at } => {
            // Self-assisted pick: the line is served without a mate.
            if let Task::MultiPointGather(g) = &s.task {
                let stop = g
                    .stops
                    .iter()
                    .find(|st| st.location == at && !s.gathered.contains(&st.address));
                if let Some(stop) = stop {
                    let address = stop.address.clone();
                    book.mark_line_completed(g.order, &address)?;
                    s.gathered.push(address);
                    s.stats.picks += 1;
                }
            }
        }
        State::PreparePartialTask { .. } => {}
        _ => {}
    }
    Ok(())
}

/// Service time of a station's timed state.
fn service_duration(head: &State, s: &StationState, config: &SimConfig) -> f64 {
    match head {
        State::GetPallet { .. } | State::PutPallet { .. } => config.pallet_service_secs,
        State::PreparePartialTask { .. } => config.prepare_secs,
        State::PickItem { at } => match &s.task {
            Task::MultiPointGather(g) => g
                .stops
                .iter()
                .find(|st| st.location == *at)
                .map(|st| st.service_secs * config.self_pick_factor)
                .unwrap_or(config.pallet_service_secs),
            _ => config.pallet_service_secs,
        },
        _ => 0.0,
    }
}

// ── Mate advancement ──────────────────────────────────────────────────────────

/// Process one mate's due transitions.  Mates only move, rest, and assist;
/// their assist timing is owned by the scheduler, and zone semaphores do
/// not apply to people.
fn advance_mate(
    m: &mut MateState,
    now: SimTime,
    graph: &WaypointGraph,
    oracle: &dyn PathOracle,
) -> SimResult<bool> {
    let mut progressed = false;

    loop {
        if m.movement.in_transit {
            if m.movement.hop_arrival > now {
                break;
            }
            m.movement.complete_hop(now);
            progressed = true;
            continue;
        }

        let Some(head) = m.queue.front().cloned() else {
            break;
        };

        match head {
            State::Move { to } => {
                if m.movement.is_at(to) {
                    m.queue.pop_front();
                    m.last_completed = Some(StateKind::Move);
                    progressed = true;
                    continue;
                }
                let from = m.movement.from;
                let hop = match oracle.next_waypoint(graph, from, to) {
                    Ok(hop) => hop,
                    Err(e) => {
                        warn!(mate = %m.id, target = %to, error = %e, "no route; holding position");
                        break;
                    }
                };
                if hop == from {
                    break;
                }
                let secs = match graph.edge_length(from, hop) {
                    Some(len) => len as f64 / m.speed_mps,
                    None => oracle.travel_secs(graph, from, hop, m.speed_mps)?,
                };
                m.movement.begin_hop(hop, to, now, secs);
                progressed = true;
                break;
            }

            // Assist timing belongs to the scheduler; resting ends with a
            // task replacement.
            State::PerformAssist { .. } | State::Rest { .. } => break,

            // Plans built for mates contain only moves, assists, and rest.
            _ => break,
        }
    }

    Ok(progressed)
}
