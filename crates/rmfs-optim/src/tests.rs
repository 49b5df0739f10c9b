//! Unit tests for rmfs-optim, including live round-trips against a minimal
//! in-process HTTP fixture.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rmfs_agent::{Fleet, MateState, StationState};
use rmfs_core::{MateId, OrderId, PodId, SimTime, StationId, WaypointId};
use rmfs_layout::WaypointGraphBuilder;
use rmfs_order::{BatchingPolicy, OrderBook, OrderError, OrderLine};
use rmfs_task::{GatherStop, GatherTask, Task};

use crate::{
    snapshot_batch, OptimError, OptimizationCheck, OptimizerClient, OrderBatch, RemoteBatching,
};

// ── HTTP fixture ──────────────────────────────────────────────────────────────

/// Serve `responses` (JSON bodies) to sequential connections on a fresh
/// loopback port; captured request bodies are sent through the returned
/// channel.
fn serve(responses: Vec<&'static str>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for body in responses {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let request = read_request(&mut stream);
            let _ = tx.send(request);
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (base, rx)
}

/// Read one HTTP request and return its body.
fn read_request(stream: &mut std::net::TcpStream) -> String {
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let (header_end, content_length) = loop {
        let n = stream.read(&mut chunk).unwrap();
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let len = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            break (pos + 4, len);
        }
    };
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).unwrap();
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buf[header_end..header_end + content_length]).into_owned()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn client(base: &str) -> OptimizerClient {
    OptimizerClient::new(base, Duration::from_secs(5)).unwrap()
}

// ── Instance fixtures ─────────────────────────────────────────────────────────

fn small_world() -> (OrderBook, Fleet, rmfs_layout::WaypointGraph) {
    let mut b = WaypointGraphBuilder::grid(2, 3, 1.0);
    b.set_storage(WaypointId(1), "A1");
    b.set_storage(WaypointId(2), "A2");
    let graph = b.build();

    let mut book = OrderBook::new();
    book.submit(
        vec![
            OrderLine::new("A1", WaypointId(1), PodId(0), 4.0),
            OrderLine::new("A2", WaypointId(2), PodId(1), 4.0),
        ],
        SimTime::ZERO,
        None,
    );

    let fleet = Fleet::new(
        vec![
            StationState::new(StationId(0), WaypointId(0), 1.5, 2),
            StationState::new(StationId(1), WaypointId(3), 1.5, 2),
        ],
        vec![MateState::new(MateId(0), WaypointId(4), 1.2)],
    );
    (book, fleet, graph)
}

fn empty_batch() -> OrderBatch {
    OrderBatch {
        no_bots: 0,
        no_pickers: 0,
        caller_id: 0,
        orders: vec![],
        pickers: vec![],
        bots: vec![],
        available_bots: vec![],
    }
}

// ── DTO wire shape ────────────────────────────────────────────────────────────

#[test]
fn batch_serializes_with_wire_field_names() {
    let json = serde_json::to_value(empty_batch()).unwrap();
    let obj = json.as_object().unwrap();
    assert!(obj.contains_key("no_bots"));
    assert!(obj.contains_key("no_pickers"));
    assert!(obj.contains_key("caller_id"));
    // Renamed field keeps its wire casing.
    assert!(obj.contains_key("availableBots"));
    assert!(!obj.contains_key("available_bots"));
}

#[test]
fn init_response_reads_upper_case_status() {
    let r: crate::InitResponse = serde_json::from_str(r#"{"STATUS": "OK"}"#).unwrap();
    assert_eq!(r.status, "OK");
}

#[test]
fn picker_schedules_deserialize() {
    let raw = r#"{"picker_schedules": [
        {"picker_id": 0, "assignments": [{"item": "A1", "bot_id": 7}]}
    ]}"#;
    let r: crate::PickerSchedulesResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(r.picker_schedules.len(), 1);
    assert_eq!(r.picker_schedules[0].assignments[0].item, "A1");
    assert_eq!(r.picker_schedules[0].assignments[0].bot_id, 7);
}

// ── Snapshot construction ─────────────────────────────────────────────────────

#[test]
fn snapshot_translates_addresses_and_orders_partials_first() {
    let (mut book, mut fleet, graph) = small_world();

    // Station 0 is mid-gather on a second order: one item already picked.
    let active = book.submit(
        vec![
            OrderLine::new("A1", WaypointId(1), PodId(0), 4.0),
            OrderLine::new("A2", WaypointId(2), PodId(1), 4.0),
        ],
        SimTime::ZERO,
        Some(SimTime(500.0)),
    );
    book.allocate(active, &mut fleet.stations[0], SimTime::ZERO).unwrap();
    book.mark_line_completed(active, "A1").unwrap();
    fleet.stations[0].task = Task::MultiPointGather(GatherTask::new(
        active,
        vec![GatherStop {
            location: WaypointId(2),
            pod: PodId(1),
            address: "A2".into(),
            service_secs: 4.0,
        }],
    ));
    fleet.stations[0].gathered.push("A1".into());

    let batch = snapshot_batch(
        &book,
        &fleet.stations,
        &fleet.mates,
        &graph,
        StationId(0),
        100,
    );

    assert_eq!(batch.no_bots, 2);
    assert_eq!(batch.no_pickers, 1);
    assert_eq!(batch.caller_id, 0);

    // Partial order leads and carries only its open items.
    assert_eq!(batch.orders[0].bot_id, 0);
    assert_eq!(batch.orders[0].items, vec!["A2".to_string()]);
    assert_eq!(batch.orders[0].deadline, 500.0);
    // Pending whole order follows with bot_id -1 and all items.
    assert_eq!(batch.orders[1].bot_id, -1);
    assert_eq!(batch.orders[1].items, vec!["A1".to_string(), "A2".to_string()]);
    assert_eq!(batch.orders[1].deadline, -1.0);

    // Positions are wire addresses or row/col composites, never raw IDs.
    assert_eq!(batch.pickers[0].position, "r1c1");
    assert_eq!(batch.bots[0].position, "r0c0");
    assert_eq!(batch.available_bots, vec![0, 1]);
}

#[test]
fn snapshot_respects_pending_limit() {
    let (mut book, fleet, graph) = small_world();
    for _ in 0..5 {
        book.submit(
            vec![OrderLine::new("A1", WaypointId(1), PodId(0), 4.0)],
            SimTime::ZERO,
            None,
        );
    }
    let batch = snapshot_batch(&book, &fleet.stations, &fleet.mates, &graph, StationId(0), 3);
    assert_eq!(batch.orders.len(), 3);
    assert!(batch.orders.iter().all(|o| o.bot_id == -1));
}

// ── Consistency check ─────────────────────────────────────────────────────────

#[test]
fn reordered_gathered_prefix_is_rejected() {
    // Bot already holds "A1"; a response reordering to ["A2", "A1"]
    // contradicts the pick that already happened.
    let planned = vec!["A2".to_string(), "A1".to_string()];
    let gathered = vec!["A1".to_string()];
    let err = OptimizationCheck::check_order_consistency(&planned, &gathered).unwrap_err();
    assert!(matches!(err, OptimError::Inconsistent(_)));
}

#[test]
fn matching_prefix_is_accepted() {
    let planned = vec!["A1".to_string(), "A2".to_string(), "A3".to_string()];
    OptimizationCheck::check_order_consistency(&planned, &["A1".to_string()]).unwrap();
    OptimizationCheck::check_order_consistency(&planned, &[]).unwrap();
    OptimizationCheck::check_order_consistency(&planned, &planned.clone()).unwrap();
}

#[test]
fn gathered_longer_than_plan_is_rejected() {
    let planned = vec!["A1".to_string()];
    let gathered = vec!["A1".to_string(), "A2".to_string()];
    assert!(OptimizationCheck::check_order_consistency(&planned, &gathered).is_err());
}

#[test]
fn next_item_must_be_open_and_remaining() {
    let remaining = vec!["A2".to_string(), "A3".to_string()];
    let gathered = vec!["A1".to_string()];

    OptimizationCheck::check_next_item("A2", &remaining, &gathered).unwrap();
    // Already picked.
    assert!(OptimizationCheck::check_next_item("A1", &remaining, &gathered).is_err());
    // Not part of the plan.
    assert!(OptimizationCheck::check_next_item("Z9", &remaining, &gathered).is_err());
}

// ── Client round-trips ────────────────────────────────────────────────────────

#[test]
fn init_round_trip() {
    let (base, rx) = serve(vec![r#"{"STATUS": "OK"}"#]);
    let request = crate::InitRequest {
        access_points: [("A1".to_string(), "r0c1".to_string())].into_iter().collect(),
        bot_ids: vec![0, 1],
        picker_ids: vec![0],
        bot_speed: 1.5,
        picker_speed: 1.2,
    };
    client(&base).init(&request).unwrap();

    let sent: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
    assert_eq!(sent["bot_ids"], serde_json::json!([0, 1]));
    assert_eq!(sent["access_points"]["A1"], "r0c1");
}

#[test]
fn init_rejecting_status_is_a_protocol_error() {
    let (base, _rx) = serve(vec![r#"{"STATUS": "overloaded"}"#]);
    let request = crate::InitRequest {
        access_points: Default::default(),
        bot_ids: vec![],
        picker_ids: vec![],
        bot_speed: 1.5,
        picker_speed: 1.2,
    };
    assert!(matches!(
        client(&base).init(&request),
        Err(OptimError::Protocol(_))
    ));
}

#[test]
fn get_order_returns_bare_integer() {
    let (base, _rx) = serve(vec!["3"]);
    assert_eq!(client(&base).get_order(&empty_batch()).unwrap(), 3);

    let (base, _rx) = serve(vec!["-1"]);
    assert_eq!(client(&base).get_order(&empty_batch()).unwrap(), -1);
}

#[test]
fn get_item_unwraps_item_field() {
    let (base, _rx) = serve(vec![r#"{"item": "B4"}"#]);
    assert_eq!(client(&base).get_item(&empty_batch()).unwrap(), "B4");
}

#[test]
fn picker_schedules_round_trip() {
    let (base, _rx) = serve(vec![
        r#"{"picker_schedules": [
            {"picker_id": 0, "assignments": [{"item": "A2", "bot_id": 1}, {"item": "A1", "bot_id": 0}]},
            {"picker_id": 1, "assignments": []}
        ]}"#,
    ]);
    let schedules = client(&base)
        .get_picker_schedules(&empty_batch())
        .unwrap()
        .picker_schedules;
    assert_eq!(schedules.len(), 2);
    assert_eq!(schedules[0].assignments[0].item, "A2");
    assert_eq!(schedules[0].assignments[0].bot_id, 1);
    assert!(schedules[1].assignments.is_empty());
}

#[test]
fn http_error_status_is_surfaced() {
    // A fixture that always closes without a valid response is a transport
    // error; here we return a 500 instead and expect a protocol error.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = read_request(&mut stream);
            let _ = stream.write_all(
                b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            );
        }
    });
    assert!(matches!(
        client(&base).get_order(&empty_batch()),
        Err(OptimError::Protocol(_))
    ));
}

// ── RemoteBatching policy ─────────────────────────────────────────────────────

#[test]
fn remote_policy_binds_the_chosen_order() {
    let (mut book, mut fleet, graph) = small_world();
    let pending = book.pending_head().unwrap();
    assert_eq!(pending, OrderId(0));

    // Station 0 gets order 0; with nothing left pending the pass ends
    // without consulting the optimizer for station 1.
    let (base, rx) = serve(vec!["0"]);
    let mut policy = RemoteBatching::new(client(&base), 100);
    policy.signal_current_time(SimTime(1.0));
    policy
        .decide_about_pending_orders(&mut book, &mut fleet.stations, &graph)
        .unwrap();

    assert!(book.is_assigned(OrderId(0)));
    assert_eq!(fleet.stations[0].capacity.assigned, vec![OrderId(0)]);
    assert!(fleet.stations[1].capacity.assigned.is_empty());

    // The first request was made on behalf of station 0 with the pending
    // order visible.
    let sent: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
    assert_eq!(sent["caller_id"], 0);
    assert_eq!(sent["orders"][0]["bot_id"], -1);
}

#[test]
fn remote_policy_rejects_non_pending_choice() {
    let (mut book, mut fleet, graph) = small_world();
    // Optimizer names an order that does not exist in the pending set.
    let (base, _rx) = serve(vec!["42"]);
    let mut policy = RemoteBatching::new(client(&base), 100);
    let err = policy
        .decide_about_pending_orders(&mut book, &mut fleet.stations, &graph)
        .unwrap_err();
    assert!(matches!(err, OrderError::Policy(_)));
    // Nothing was applied.
    assert_eq!(book.partition_counts(), (1, 0, 0));
}

#[test]
fn next_pick_is_validated_against_gathered_items() {
    let (mut book, mut fleet, graph) = small_world();
    let active = book.submit(
        vec![
            OrderLine::new("A1", WaypointId(1), PodId(0), 4.0),
            OrderLine::new("A2", WaypointId(2), PodId(1), 4.0),
        ],
        SimTime::ZERO,
        None,
    );
    book.allocate(active, &mut fleet.stations[0], SimTime::ZERO).unwrap();
    book.mark_line_completed(active, "A1").unwrap();
    fleet.stations[0].task = Task::MultiPointGather(GatherTask::new(
        active,
        vec![GatherStop {
            location: WaypointId(2),
            pod: PodId(1),
            address: "A2".into(),
            service_secs: 4.0,
        }],
    ));
    fleet.stations[0].gathered.push("A1".into());

    // A still-open item is accepted.
    let (base, _rx) = serve(vec![r#"{"item": "A2"}"#]);
    let policy = RemoteBatching::new(client(&base), 100);
    assert_eq!(
        policy.next_pick(&book, &fleet, &graph, &fleet.stations[0]).unwrap(),
        "A2"
    );

    // An item the robot already picked contradicts physical reality.
    let (base, _rx) = serve(vec![r#"{"item": "A1"}"#]);
    let policy = RemoteBatching::new(client(&base), 100);
    assert!(matches!(
        policy.next_pick(&book, &fleet, &graph, &fleet.stations[0]),
        Err(OptimError::Inconsistent(_))
    ));
}

#[test]
fn unreachable_optimizer_fails_the_pass() {
    let (mut book, mut fleet, graph) = small_world();
    // Nothing listens on this port (bound then dropped).
    let base = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let mut policy = RemoteBatching::new(
        OptimizerClient::new(base, Duration::from_millis(250)).unwrap(),
        100,
    );
    assert!(policy
        .decide_about_pending_orders(&mut book, &mut fleet.stations, &graph)
        .is_err());
}
