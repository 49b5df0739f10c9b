//! Fluent builder for constructing a [`Controller`].

use std::collections::BTreeSet;

use rmfs_agent::{Fleet, MateState, StationState};
use rmfs_alloc::TaskAllocator;
use rmfs_core::{EventClock, MateId, SimConfig, SimRng, SimTime, StationId, WaypointId, ZoneId};
use rmfs_layout::{PalletStands, PathOracle, WaypointGraph};
use rmfs_ledger::ResourceLedger;
use rmfs_mate::{EarliestFeasible, MateScheduling, SeeOff};
use rmfs_order::{BatchingPolicy, GreedyBatching, OrderBook};

use crate::{Controller, SimError, SimResult};

/// Fluent builder for [`Controller<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — durations, thresholds, margins, seed
/// - [`WaypointGraph`] + [`PalletStands`] — the instance layout
/// - `R: PathOracle` — the path/time estimator
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                                      |
/// |-------------------------|----------------------------------------------|
/// | `.stations(pos, speed)` | no stations                                  |
/// | `.mates(pos, speed)`    | no mates                                     |
/// | `.resting_locations(v)` | empty pool (idle agents stay where they are) |
/// | `.zone(id, capacity)`   | no zones registered                          |
/// | `.policy(p)`            | [`GreedyBatching`]                           |
/// | `.scheduler(s)`         | chosen from `config.see_off_scheduling`      |
///
/// `build` validates the instance — zero capacity, stand-less layouts,
/// out-of-graph or forbidden positions, and unregistered zone tags are
/// rejected before the run starts rather than failing mid-run.
pub struct ControllerBuilder<R: PathOracle> {
    config: SimConfig,
    graph: WaypointGraph,
    stands: PalletStands,
    oracle: R,
    station_positions: Vec<WaypointId>,
    station_speed: f64,
    mate_positions: Vec<WaypointId>,
    mate_speed: f64,
    resting: Vec<WaypointId>,
    zones: Vec<(ZoneId, u32)>,
    policy: Option<Box<dyn BatchingPolicy>>,
    scheduler: Option<Box<dyn MateScheduling>>,
}

impl<R: PathOracle> ControllerBuilder<R> {
    pub fn new(config: SimConfig, graph: WaypointGraph, stands: PalletStands, oracle: R) -> Self {
        Self {
            config,
            graph,
            stands,
            oracle,
            station_positions: Vec::new(),
            station_speed: 1.5,
            mate_positions: Vec::new(),
            mate_speed: 1.2,
            resting: Vec::new(),
            zones: Vec::new(),
            policy: None,
            scheduler: None,
        }
    }

    /// Station starting waypoints and their cruise speed.
    pub fn stations(mut self, positions: Vec<WaypointId>, speed_mps: f64) -> Self {
        self.station_positions = positions;
        self.station_speed = speed_mps;
        self
    }

    /// Mate starting waypoints and their walking speed.
    pub fn mates(mut self, positions: Vec<WaypointId>, speed_mps: f64) -> Self {
        self.mate_positions = positions;
        self.mate_speed = speed_mps;
        self
    }

    /// Waypoints forming the free resting pool.
    pub fn resting_locations(mut self, slots: Vec<WaypointId>) -> Self {
        self.resting = slots;
        self
    }

    /// Register a queue zone's admission capacity.
    pub fn zone(mut self, zone: ZoneId, capacity: u32) -> Self {
        self.zones.push((zone, capacity));
        self
    }

    /// Replace the default greedy batching policy.
    pub fn policy(mut self, policy: Box<dyn BatchingPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Replace the config-selected mate scheduler.
    pub fn scheduler(mut self, scheduler: Box<dyn MateScheduling>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Validate the instance and produce a ready-to-run [`Controller`].
    pub fn build(self) -> SimResult<Controller<R>> {
        self.config
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))?;

        if self.stands.is_empty() {
            return Err(SimError::Config(
                "instance needs at least one input and one output pallet stand".into(),
            ));
        }

        // All referenced waypoints must exist and be usable.
        let all_positions = self
            .station_positions
            .iter()
            .chain(&self.mate_positions)
            .chain(&self.resting)
            .chain(&self.stands.inputs)
            .chain(&self.stands.outputs);
        for &wp in all_positions {
            if !self.graph.contains(wp) {
                return Err(SimError::Config(format!("{wp} is not part of the layout")));
            }
            if self.graph.waypoints[wp.index()].flags.forbidden {
                return Err(SimError::Config(format!("{wp} is forbidden")));
            }
        }

        // Every zone tag appearing in the layout must have a registered
        // semaphore, or the protection would be silently void.
        let registered: BTreeSet<ZoneId> = self.zones.iter().map(|&(z, _)| z).collect();
        for wp in &self.graph.waypoints {
            if let Some(zone) = wp.zone {
                if !registered.contains(&zone) {
                    return Err(SimError::Config(format!(
                        "zone {zone} is used by the layout but has no registered capacity"
                    )));
                }
            }
        }

        // ── Ledger ────────────────────────────────────────────────────────
        let mut ledger = ResourceLedger::new();
        ledger.seed_resting_pool(self.resting.iter().copied());
        for (zone, capacity) in self.zones {
            ledger.register_zone(zone, capacity);
        }

        // ── Fleet ─────────────────────────────────────────────────────────
        let stations = self
            .station_positions
            .iter()
            .enumerate()
            .map(|(i, &wp)| {
                StationState::new(
                    StationId(i as u32),
                    wp,
                    self.station_speed,
                    self.config.station_capacity,
                )
            })
            .collect();
        let mates = self
            .mate_positions
            .iter()
            .enumerate()
            .map(|(i, &wp)| MateState::new(MateId(i as u32), wp, self.mate_speed))
            .collect();
        let fleet = Fleet::new(stations, mates);

        // ── Strategies ────────────────────────────────────────────────────
        let policy = self
            .policy
            .unwrap_or_else(|| Box::new(GreedyBatching::new()));
        let scheduler = self.scheduler.unwrap_or_else(|| {
            if self.config.see_off_scheduling {
                Box::new(SeeOff::new(&self.config)) as Box<dyn MateScheduling>
            } else {
                Box::new(EarliestFeasible::new(&self.config))
            }
        });
        let allocator = TaskAllocator::new(&self.config);
        let rng = SimRng::new(self.config.seed);

        Ok(Controller {
            clock: EventClock::new(),
            graph: self.graph,
            stands: self.stands,
            ledger,
            fleet,
            book: OrderBook::new(),
            oracle: self.oracle,
            policy,
            allocator,
            scheduler,
            rng,
            last_update: SimTime::ZERO,
            stopped: false,
            config: self.config,
        })
    }
}
