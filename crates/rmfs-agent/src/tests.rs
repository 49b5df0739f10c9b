//! Unit tests for rmfs-agent.

use rmfs_core::{MateId, OrderId, SimRng, SimTime, StationId, WaypointId};
use rmfs_ledger::ResourceLedger;
use rmfs_task::{State, Task};

use crate::{Drivable, Fleet, MateState, MovementState, StationState, Tasked};

fn wp(n: u32) -> WaypointId {
    WaypointId(n)
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn hop_lifecycle() {
    let mut m = MovementState::stationary(wp(0), SimTime::ZERO);
    assert!(m.is_at(wp(0)));
    assert!(m.next_event().is_never());

    m.begin_hop(wp(1), wp(5), SimTime(10.0), 2.0);
    assert!(m.in_transit);
    assert_eq!(m.next_event(), SimTime(12.0));
    // Teleport-at-arrival: still occupies the departure waypoint mid-hop.
    assert_eq!(m.from, wp(0));
    assert!(!m.is_at(wp(0)), "in transit counts as not-parked");

    let arrived = m.complete_hop(SimTime(12.0));
    assert_eq!(arrived, wp(1));
    assert!(m.is_at(wp(1)));
    assert_eq!(m.target, wp(5));
}

#[test]
fn cancel_snaps_back_to_departure() {
    let mut m = MovementState::stationary(wp(0), SimTime::ZERO);
    m.begin_hop(wp(1), wp(5), SimTime(1.0), 4.0);
    m.cancel(SimTime(2.0));
    assert!(m.is_at(wp(0)));
    assert_eq!(m.target, wp(0));
    assert!(m.next_event().is_never());
}

// ── Capacity ──────────────────────────────────────────────────────────────────

#[test]
fn capacity_bind_and_unbind() {
    let mut s = StationState::new(StationId(0), wp(0), 1.5, 2);
    assert!(s.capacity.has_capacity());
    assert!(s.capacity.bind(OrderId(0)));
    assert!(s.capacity.bind(OrderId(1)));
    // Full.
    assert!(!s.capacity.bind(OrderId(2)));
    assert_eq!(s.capacity.in_use(), 2);

    assert!(s.capacity.unbind(OrderId(0)));
    assert!(!s.capacity.unbind(OrderId(0)));
    assert_eq!(s.next_assigned_order(), Some(OrderId(1)));
}

// ── Task assignment ───────────────────────────────────────────────────────────

#[test]
fn assign_task_discards_plan_and_releases_claims() {
    let mut ledger = ResourceLedger::new();
    let mut s = StationState::new(StationId(0), wp(0), 1.5, 2);

    // Plan holding a stand registration and a locked rendezvous.
    ledger.note_inbound(wp(10));
    ledger.lock_position(wp(20), s.actor_id()).unwrap();
    s.queue.extend([
        State::Move { to: wp(10) },
        State::GetPallet { stand: wp(10) },
        State::Move { to: wp(20) },
        State::WaitingForMate { at: wp(20), locked: true },
    ]);

    s.assign_task(Task::Aborting, &mut ledger);

    assert!(s.queue.is_empty());
    assert!(matches!(s.task, Task::Aborting));
    assert_eq!(ledger.inbound(wp(10)), 0);
    assert!(!ledger.is_locked(wp(20)));
    assert!(ledger.claims_of(s.actor_id()).is_empty());
}

#[test]
fn assign_task_releases_resting_claim() {
    let mut ledger = ResourceLedger::new();
    let mut rng = SimRng::new(0);
    let mut m = MateState::new(MateId(0), wp(0), 1.2);

    ledger.seed_resting_pool([wp(30)]);
    let slot = ledger.claim_resting(m.actor_id(), &mut rng).unwrap();
    m.queue.extend([State::Move { to: slot }, State::Rest { at: slot }]);
    m.task = Task::Rest { at: slot };

    m.assign_task(
        Task::Assist { station: StationId(1), at: wp(9) },
        &mut ledger,
    );

    assert_eq!(ledger.resting_free_len(), 1);
    assert!(m.is_idle());
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[test]
fn fleet_lookup_by_typed_id() {
    let fleet = Fleet::new(
        vec![
            StationState::new(StationId(0), wp(0), 1.5, 2),
            StationState::new(StationId(1), wp(1), 1.5, 2),
        ],
        vec![MateState::new(MateId(0), wp(2), 1.2)],
    );

    assert_eq!(fleet.station_count(), 2);
    assert_eq!(fleet.mate_count(), 1);
    assert_eq!(fleet.station(StationId(1)).unwrap().at(), wp(1));
    assert!(fleet.station(StationId(5)).is_err());
    assert!(fleet.mate(MateId(0)).is_ok());
    assert!(fleet.mate(MateId(3)).is_err());
}
