//! Batch snapshot construction.

use rmfs_agent::{Drivable, MateState, StationState};
use rmfs_core::{StationId, WaypointId};
use rmfs_layout::WaypointGraph;
use rmfs_order::OrderBook;

use crate::dto::{BotInfo, OrderBatch, OrderInfo, PickerInfo};

/// Wire position of a waypoint: its address tag when it has one, otherwise
/// a `r<row>c<col>` composite.
pub fn wire_position(graph: &WaypointGraph, wp: WaypointId) -> String {
    match graph.address_of(wp) {
        Some(addr) => addr.to_string(),
        None => {
            let node = &graph.waypoints[wp.index()];
            format!("r{}c{}", node.row, node.col)
        }
    }
}

/// Build the consistent snapshot the batch-taking endpoints require.
///
/// Orders included: every in-progress partial order (a station is already
/// gathering it — `bot_id` names the station and `items` holds only the
/// still-open addresses) followed by up to `pending_limit` pending whole
/// orders (`bot_id == -1`), in FIFO order.  All locations are wire
/// addresses, never internal waypoint IDs.
///
/// `no_pickers` counts the mates passed in; callers that make a
/// station-only decision (order binding) may pass an empty mate slice.
pub fn snapshot_batch(
    book: &OrderBook,
    stations: &[StationState],
    mates: &[MateState],
    graph: &WaypointGraph,
    caller: StationId,
    pending_limit: usize,
) -> OrderBatch {
    let mut orders = Vec::new();

    // In-progress orders first: one per station actively gathering.
    for station in stations {
        let Some(order_id) = station.task.order() else {
            continue;
        };
        if let Ok(order) = book.order(order_id) {
            orders.push(OrderInfo {
                order_id: order_id.0 as i64,
                bot_id: station.id.0 as i64,
                deadline: order.deadline.map_or(-1.0, |t| t.0),
                items: order.open_lines().map(|l| l.address.clone()).collect(),
                times: order.open_lines().map(|l| l.service_secs).collect(),
            });
        }
    }

    // Then pending whole orders, bounded.
    for order_id in book.pending_ids().take(pending_limit) {
        if let Ok(order) = book.order(order_id) {
            orders.push(OrderInfo {
                order_id: order_id.0 as i64,
                bot_id: -1,
                deadline: order.deadline.map_or(-1.0, |t| t.0),
                items: order.lines.iter().map(|l| l.address.clone()).collect(),
                times: order.lines.iter().map(|l| l.service_secs).collect(),
            });
        }
    }

    let pickers = mates
        .iter()
        .map(|m| PickerInfo {
            picker_id: m.id.0 as i64,
            position: wire_position(graph, m.at()),
            busy: m.current_assist.is_some(),
        })
        .collect();

    let bots = stations
        .iter()
        .map(|s| BotInfo {
            bot_id: s.id.0 as i64,
            position: wire_position(graph, s.at()),
            items: s
                .task
                .order()
                .and_then(|o| book.order(o).ok())
                .map(|o| o.open_lines().map(|l| l.address.clone()).collect())
                .unwrap_or_default(),
        })
        .collect();

    let available_bots = stations
        .iter()
        .filter(|s| s.capacity.has_capacity())
        .map(|s| s.id.0 as i64)
        .collect();

    OrderBatch {
        no_bots: stations.len(),
        no_pickers: mates.len(),
        caller_id: caller.0 as i64,
        orders,
        pickers,
        bots,
        available_bots,
    }
}
