//! Order and order-line types.

use rmfs_core::{OrderId, PodId, SimTime, WaypointId};

// ── OrderLine ─────────────────────────────────────────────────────────────────

/// One position of an order: an item at a storage location.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// Wire address of the storage location.
    pub address: String,

    /// Access waypoint of the storage location.
    pub location: WaypointId,

    /// Pod the item sits on.
    pub pod: PodId,

    /// Pick service time in seconds.
    pub service_secs: f64,

    /// `true` once the item has been picked.
    pub completed: bool,
}

impl OrderLine {
    pub fn new(
        address: impl Into<String>,
        location: WaypointId,
        pod: PodId,
        service_secs: f64,
    ) -> Self {
        Self {
            address: address.into(),
            location,
            pod,
            service_secs,
            completed: false,
        }
    }
}

// ── Order ─────────────────────────────────────────────────────────────────────

/// A pick order: an ordered list of positions with a completed/open
/// partition.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,

    /// Instant the order entered the system.
    pub created: SimTime,

    /// Fulfilment deadline, if the instance carries one.
    pub deadline: Option<SimTime>,

    /// Positions in picking order.
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Positions not yet picked, in order.
    pub fn open_lines(&self) -> impl Iterator<Item = &OrderLine> {
        self.lines.iter().filter(|l| !l.completed)
    }

    /// The next position to pick, if any.
    pub fn first_open(&self) -> Option<&OrderLine> {
        self.open_lines().next()
    }

    /// `true` once every position is served.
    pub fn is_complete(&self) -> bool {
        self.lines.iter().all(|l| l.completed)
    }

    /// `true` when some but not all positions are served.
    pub fn is_partial(&self) -> bool {
        let done = self.lines.iter().filter(|l| l.completed).count();
        done > 0 && done < self.lines.len()
    }

    /// Mark the line at `address` picked.  Returns `false` if no open line
    /// carries that address.
    pub fn mark_line_completed(&mut self, address: &str) -> bool {
        match self
            .lines
            .iter_mut()
            .find(|l| !l.completed && l.address == address)
        {
            Some(line) => {
                line.completed = true;
                true
            }
            None => false,
        }
    }
}
