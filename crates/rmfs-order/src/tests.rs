//! Unit tests for rmfs-order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rmfs_agent::StationState;
use rmfs_core::{OrderId, PodId, SimTime, StationId, WaypointId};
use rmfs_layout::WaypointGraph;

use crate::{BatchingPolicy, GreedyBatching, OrderBook, OrderError, OrderLine, OrderObserver};

fn line(address: &str, wp: u32) -> OrderLine {
    OrderLine::new(address, WaypointId(wp), PodId(0), 4.0)
}

fn station(n: u32, capacity: u32) -> StationState {
    StationState::new(StationId(n), WaypointId(0), 1.5, capacity)
}

fn submit_order(book: &mut OrderBook, addresses: &[&str]) -> OrderId {
    let lines = addresses.iter().enumerate().map(|(i, a)| line(a, i as u32)).collect();
    book.submit(lines, SimTime::ZERO, None)
}

// ── Order lines ───────────────────────────────────────────────────────────────

#[test]
fn line_completion_partitions_the_order() {
    let mut book = OrderBook::new();
    let id = submit_order(&mut book, &["A1", "A2"]);

    assert!(book.mark_line_completed(id, "A1").unwrap());
    let order = book.order(id).unwrap();
    assert!(order.is_partial());
    assert_eq!(order.first_open().unwrap().address, "A2");

    let mut book2 = OrderBook::new();
    let id2 = submit_order(&mut book2, &["B1"]);
    assert!(book2.mark_line_completed(id2, "B1").unwrap());
    assert!(book2.order(id2).unwrap().is_complete());
    // Marking an unknown or already-completed address is a no-op signal.
    assert!(!book2.mark_line_completed(id2, "B1").unwrap());
    assert!(!book2.mark_line_completed(id2, "Z9").unwrap());
}

// ── Partition / conservation ──────────────────────────────────────────────────

#[test]
fn orders_move_through_exactly_one_set() {
    let mut book = OrderBook::new();
    let mut st = station(0, 2);
    let a = submit_order(&mut book, &["A1"]);
    let b = submit_order(&mut book, &["B1"]);

    assert_eq!(book.partition_counts(), (2, 0, 0));
    assert!(book.partition_ok());

    assert!(book.allocate(a, &mut st, SimTime::ZERO).unwrap());
    assert_eq!(book.partition_counts(), (1, 1, 0));
    assert!(book.partition_ok());

    book.mark_line_completed(a, "A1").unwrap();
    book.complete(a, &mut st, SimTime(5.0)).unwrap();
    assert_eq!(book.partition_counts(), (1, 0, 1));
    assert!(book.partition_ok());
    assert_eq!(book.total_created(), 2);
    assert!(book.pending_ids().collect::<Vec<_>>().contains(&b));
}

#[test]
fn allocate_requires_pending_status() {
    let mut book = OrderBook::new();
    let mut st = station(0, 2);
    let a = submit_order(&mut book, &["A1"]);

    book.allocate(a, &mut st, SimTime::ZERO).unwrap();
    // Second allocation of the same order: no longer pending.
    assert!(matches!(
        book.allocate(a, &mut st, SimTime::ZERO),
        Err(OrderError::NotPending(_))
    ));
    assert!(matches!(
        book.allocate(OrderId(99), &mut st, SimTime::ZERO),
        Err(OrderError::UnknownOrder(_))
    ));
}

#[test]
fn allocate_at_capacity_is_a_noop() {
    let mut book = OrderBook::new();
    let mut st = station(0, 1);
    let a = submit_order(&mut book, &["A1"]);
    let b = submit_order(&mut book, &["B1"]);

    assert!(book.allocate(a, &mut st, SimTime::ZERO).unwrap());
    // Station full: order b stays pending, nothing changes.
    assert!(!book.allocate(b, &mut st, SimTime::ZERO).unwrap());
    assert_eq!(book.partition_counts(), (1, 1, 0));
    assert_eq!(st.capacity.in_use(), 1);
}

#[test]
fn complete_requires_assigned_status() {
    let mut book = OrderBook::new();
    let mut st = station(0, 1);
    let a = submit_order(&mut book, &["A1"]);
    assert!(matches!(
        book.complete(a, &mut st, SimTime::ZERO),
        Err(OrderError::NotAssigned(_))
    ));
}

// ── Observer ──────────────────────────────────────────────────────────────────

struct CountingObserver {
    allocated: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    refills:   Arc<AtomicUsize>,
}

impl OrderObserver for CountingObserver {
    fn on_order_allocated(&mut self, _o: OrderId, _s: StationId) {
        self.allocated.fetch_add(1, Ordering::SeqCst);
    }
    fn on_order_completed(&mut self, _o: OrderId, _s: StationId) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_refilling_ended(&mut self, _a: &str, qty: u32) {
        self.refills.fetch_add(qty as usize, Ordering::SeqCst);
    }
}

#[test]
fn observers_see_lifecycle_events() {
    let allocated = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let refills = Arc::new(AtomicUsize::new(0));

    let mut book = OrderBook::new();
    book.add_observer(Box::new(CountingObserver {
        allocated: Arc::clone(&allocated),
        completed: Arc::clone(&completed),
        refills:   Arc::clone(&refills),
    }));

    let mut st = station(0, 1);
    let a = submit_order(&mut book, &["A1"]);
    book.allocate(a, &mut st, SimTime::ZERO).unwrap();
    book.mark_line_completed(a, "A1").unwrap();
    book.complete(a, &mut st, SimTime(1.0)).unwrap();
    book.on_refilling_ended("A1", 12);

    assert_eq!(allocated.load(Ordering::SeqCst), 1);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(refills.load(Ordering::SeqCst), 12);
}

// ── Greedy policy ─────────────────────────────────────────────────────────────

#[test]
fn greedy_binds_fifo_head_to_first_available_station() {
    let mut book = OrderBook::new();
    let a = submit_order(&mut book, &["A1"]);
    let b = submit_order(&mut book, &["B1"]);

    // Station 0 is full; station 1 takes the head.
    let mut stations = vec![station(0, 1), station(1, 1)];
    stations[0].capacity.bind(OrderId(77));

    let mut policy = GreedyBatching::new();
    policy.signal_current_time(SimTime::ZERO);
    policy
        .decide_about_pending_orders(&mut book, &mut stations, &WaypointGraph::empty())
        .unwrap();

    assert!(book.is_assigned(a));
    assert_eq!(stations[1].capacity.assigned, vec![a]);
    assert_eq!(book.pending_head(), Some(b));
}

#[test]
fn greedy_binds_one_order_per_station_per_pass() {
    // One station with capacity 2, two pending orders, one pass:
    // exactly one binding happens, one order stays pending.
    let mut book = OrderBook::new();
    let a = submit_order(&mut book, &["A1"]);
    let _b = submit_order(&mut book, &["B1"]);

    let mut stations = vec![station(0, 2)];
    let mut policy = GreedyBatching::new();
    policy.signal_current_time(SimTime::ZERO);
    policy
        .decide_about_pending_orders(&mut book, &mut stations, &WaypointGraph::empty())
        .unwrap();

    assert_eq!(book.partition_counts(), (1, 1, 0));
    assert_eq!(stations[0].capacity.assigned, vec![a]);

    // The second pass picks up the remaining order.
    policy
        .decide_about_pending_orders(&mut book, &mut stations, &WaypointGraph::empty())
        .unwrap();
    assert_eq!(book.partition_counts(), (0, 2, 0));
}

#[test]
fn greedy_with_nothing_pending_is_quiet() {
    let mut book = OrderBook::new();
    let mut stations = vec![station(0, 1)];
    GreedyBatching::new()
        .decide_about_pending_orders(&mut book, &mut stations, &WaypointGraph::empty())
        .unwrap();
    assert_eq!(book.partition_counts(), (0, 0, 0));
}
