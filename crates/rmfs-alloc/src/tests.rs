//! Unit tests for rmfs-alloc.

use rmfs_agent::{MateState, StationState};
use rmfs_core::{MateId, PodId, SimConfig, SimRng, SimTime, StationId, WaypointId};
use rmfs_layout::{DijkstraOracle, PalletStands, WaypointGraph, WaypointGraphBuilder};
use rmfs_ledger::ResourceLedger;
use rmfs_order::{OrderBook, OrderLine};
use rmfs_task::{State, StateKind, Task};

use crate::{AllocCtx, TaskAllocator};

fn wp(n: u32) -> WaypointId {
    WaypointId(n)
}

struct World {
    config: SimConfig,
    graph: WaypointGraph,
    stands: PalletStands,
    ledger: ResourceLedger,
    rng: SimRng,
}

impl World {
    /// 1×8 corridor: stand candidates and storage all on one line.
    fn corridor() -> Self {
        let mut b = WaypointGraphBuilder::grid(1, 8, 1.0);
        b.set_storage(wp(3), "A1");
        b.set_storage(wp(4), "A2");
        let graph = b.build();
        Self {
            config: SimConfig::default(),
            graph,
            stands: PalletStands::new(vec![wp(0), wp(7)], vec![wp(6)]),
            ledger: ResourceLedger::new(),
            rng: SimRng::new(7),
        }
    }

    fn ctx(&mut self, now: SimTime) -> AllocCtx<'_> {
        AllocCtx {
            now,
            config: &self.config,
            graph: &self.graph,
            stands: &self.stands,
            oracle: &DijkstraOracle,
            ledger: &mut self.ledger,
            rng: &mut self.rng,
        }
    }
}

fn station_with_order(book: &mut OrderBook, at: WaypointId) -> StationState {
    let mut station = StationState::new(StationId(0), at, 1.5, 2);
    let order = book.submit(
        vec![
            OrderLine::new("A1", wp(3), PodId(0), 4.0),
            OrderLine::new("A2", wp(4), PodId(1), 5.0),
        ],
        SimTime::ZERO,
        None,
    );
    book.allocate(order, &mut station, SimTime::ZERO).unwrap();
    station
}

// ── Gather plan construction ──────────────────────────────────────────────────

#[test]
fn gather_plan_visits_stand_lines_stand() {
    let mut world = World::corridor();
    let mut book = OrderBook::new();
    let mut station = station_with_order(&mut book, wp(1));

    let allocator = TaskAllocator::new(&world.config);
    let assigned = allocator
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();
    assert!(assigned);

    let kinds: Vec<StateKind> = station.queue.iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            StateKind::Move,           // to input stand
            StateKind::GetPallet,
            StateKind::Move,           // to A1
            StateKind::WaitingForMate,
            StateKind::Move,           // to A2
            StateKind::WaitingForMate,
            StateKind::Move,           // to output stand
            StateKind::PutPallet,
        ]
    );
    // Nearest input stand from wp1 is wp0; the only output stand is wp6.
    assert_eq!(station.queue.front(), Some(&State::Move { to: wp(0) }));
    assert!(matches!(station.task, Task::MultiPointGather(ref g) if g.stops.len() == 2));
    // Both stand visits are registered inbound.
    assert_eq!(world.ledger.inbound(wp(0)), 1);
    assert_eq!(world.ledger.inbound(wp(6)), 1);
}

#[test]
fn see_off_config_plans_see_off_waits() {
    let mut world = World::corridor();
    world.config.see_off_scheduling = true;
    let mut book = OrderBook::new();
    let mut station = station_with_order(&mut book, wp(1));

    let allocator = TaskAllocator::new(&world.config);
    allocator
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();
    assert!(station
        .queue
        .iter()
        .any(|s| s.kind() == StateKind::WaitingForSeeOff));
    assert!(!station
        .queue
        .iter()
        .any(|s| s.kind() == StateKind::WaitingForMate));
}

#[test]
fn self_assist_plans_solo_picks() {
    let mut world = World::corridor();
    world.config.bots_self_assist = true;
    let mut book = OrderBook::new();
    let mut station = station_with_order(&mut book, wp(1));

    TaskAllocator::new(&world.config)
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();
    assert_eq!(
        station.queue.iter().filter(|s| s.kind() == StateKind::PickItem).count(),
        2
    );
}

#[test]
fn carrying_pallet_skips_input_stand() {
    let mut world = World::corridor();
    let mut book = OrderBook::new();
    let mut station = station_with_order(&mut book, wp(1));
    station.carrying_pallet = true;

    TaskAllocator::new(&world.config)
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();
    assert!(!station.queue.iter().any(|s| s.kind() == StateKind::GetPallet));
    assert_eq!(station.queue.front(), Some(&State::Move { to: wp(3) }));
}

#[test]
fn resuming_partial_order_prepends_prepare() {
    let mut world = World::corridor();
    let mut book = OrderBook::new();
    let mut station = station_with_order(&mut book, wp(1));
    let order = station.capacity.assigned[0];
    book.mark_line_completed(order, "A1").unwrap();
    station.carrying_pallet = true;

    TaskAllocator::new(&world.config)
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();

    assert_eq!(
        station.queue.front().map(|s| s.kind()),
        Some(StateKind::PreparePartialTask)
    );
    // Only the open line is planned.
    let kinds: Vec<StateKind> = station.queue.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds.iter().filter(|k| **k == StateKind::WaitingForMate).count(), 1);
}

// ── Stand balancing ───────────────────────────────────────────────────────────

#[test]
fn congested_nearest_stand_loses_beyond_margin() {
    let mut world = World::corridor();
    // Default input margin is 3: wp0 (nearest from wp1) with 3 inbound vs
    // wp7 with 0 → the far stand wins.
    for _ in 0..3 {
        world.ledger.note_inbound(wp(0));
    }
    let mut book = OrderBook::new();
    let mut station = station_with_order(&mut book, wp(1));

    TaskAllocator::new(&world.config)
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();
    assert_eq!(station.queue.front(), Some(&State::Move { to: wp(7) }));
    assert_eq!(world.ledger.inbound(wp(7)), 1);
}

#[test]
fn congestion_below_margin_keeps_nearest_stand() {
    let mut world = World::corridor();
    // Two inbound is under the margin of 3: nearest still wins.
    for _ in 0..2 {
        world.ledger.note_inbound(wp(0));
    }
    let mut book = OrderBook::new();
    let mut station = station_with_order(&mut book, wp(1));

    TaskAllocator::new(&world.config)
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();
    assert_eq!(station.queue.front(), Some(&State::Move { to: wp(0) }));
    assert_eq!(world.ledger.inbound(wp(0)), 3);
}

// ── Rest ──────────────────────────────────────────────────────────────────────

#[test]
fn idle_station_rests_and_pool_drains() {
    let mut world = World::corridor();
    world.ledger.seed_resting_pool([wp(5)]);
    let mut station = StationState::new(StationId(0), wp(1), 1.5, 2);
    let book = OrderBook::new();

    let allocator = TaskAllocator::new(&world.config);
    let assigned = allocator
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();

    assert!(assigned);
    assert!(matches!(station.task, Task::Rest { at } if at == wp(5)));
    assert_eq!(station.last_rest, Some(wp(5)));
    let kinds: Vec<StateKind> = station.queue.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec![StateKind::Move, StateKind::Rest]);
    assert_eq!(world.ledger.resting_free_len(), 0);
}

#[test]
fn empty_pool_leaves_agent_idle() {
    let mut world = World::corridor();
    let mut station = StationState::new(StationId(0), wp(1), 1.5, 2);
    let book = OrderBook::new();

    let assigned = TaskAllocator::new(&world.config)
        .next_station_task(&mut station, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();

    // Valid terminal condition for the pass: no task, re-polled later.
    assert!(!assigned);
    assert!(station.task.is_none());
    assert!(station.queue.is_empty());
}

#[test]
fn one_slot_two_agents_one_rests() {
    let mut world = World::corridor();
    world.ledger.seed_resting_pool([wp(5)]);
    let book = OrderBook::new();
    let mut a = StationState::new(StationId(0), wp(1), 1.5, 2);
    let mut b = StationState::new(StationId(1), wp(2), 1.5, 2);

    let allocator = TaskAllocator::new(&world.config);
    let first = allocator
        .next_station_task(&mut a, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();
    let second = allocator
        .next_station_task(&mut b, &book, &mut world.ctx(SimTime::ZERO))
        .unwrap();

    assert!(first);
    assert!(!second, "pool exhausted: second agent stays idle");
    assert!(b.task.is_none());
}

#[test]
fn returning_rester_prefers_its_old_slot() {
    let mut world = World::corridor();
    world.ledger.seed_resting_pool([wp(5), wp(2)]);
    let mut mate = MateState::new(MateId(0), wp(1), 1.2);
    mate.last_rest = Some(wp(5));
    mate.last_completed = Some(StateKind::Rest);
    // Its old slot must be claimable again first.
    world.ledger.claim_resting_exact(wp(5), rmfs_core::ActorId::Mate(MateId(0)));
    world.ledger.release_resting(wp(5));

    let allocator = TaskAllocator::new(&world.config);
    assert!(allocator.send_mate_to_rest(&mut mate, &mut world.ctx(SimTime::ZERO)));
    assert!(matches!(mate.task, Task::Rest { at } if at == wp(5)));
}

#[test]
fn fresh_idler_draws_from_the_pool_at_random() {
    let mut world = World::corridor();
    world.ledger.seed_resting_pool([wp(5), wp(2)]);
    let mut mate = MateState::new(MateId(0), wp(1), 1.2);
    // No rest history: the preference path is skipped entirely.
    let allocator = TaskAllocator::new(&world.config);
    assert!(allocator.send_mate_to_rest(&mut mate, &mut world.ctx(SimTime::ZERO)));
    let Task::Rest { at } = mate.task else {
        panic!("expected a rest task");
    };
    assert!(at == wp(5) || at == wp(2));
    assert_eq!(world.ledger.resting_claimant(at), Some(rmfs_core::ActorId::Mate(MateId(0))));
}
