//! Order lifecycle observer.

use rmfs_core::{OrderId, StationId};

/// Callbacks fired by the [`OrderBook`][crate::OrderBook] on lifecycle
/// transitions.  Inventory/item-management collaborators subscribe here.
///
/// All methods have default no-op implementations.
pub trait OrderObserver {
    /// An order was bound to a station.
    fn on_order_allocated(&mut self, _order: OrderId, _station: StationId) {}

    /// A station served every position of an order.
    fn on_order_completed(&mut self, _order: OrderId, _station: StationId) {}

    /// Inventory replenishment finished restocking `address` with `qty`
    /// units.  Not core to scheduling; forwarded verbatim to subscribers.
    fn on_refilling_ended(&mut self, _address: &str, _qty: u32) {}
}
