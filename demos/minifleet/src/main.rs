//! minifleet — a small end-to-end run of the rust_rmfs stack.
//!
//! Builds an 8×10 grid warehouse with two input stands, one output stand,
//! a block of addressable storage, three stations and two mates, seeds a
//! handful of orders, and runs the controller to completion.
//!
//! Usage:
//!
//! ```text
//! minifleet [config.toml]
//! ```
//!
//! With no argument the built-in default configuration runs.  Set
//! `RUST_LOG=debug` to watch scheduling decisions.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use rmfs_core::{PodId, SimConfig, SimTime, WaypointId, ZoneId};
use rmfs_layout::{PalletStands, WaypointGraphBuilder, DijkstraOracle};
use rmfs_order::OrderLine;
use rmfs_optim::{InitRequest, OptimizerClient, RemoteBatching};
use rmfs_sim::{Controller, ControllerBuilder, NoopObserver};

const ROWS: u32 = 8;
const COLS: u32 = 10;

fn main() -> Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            toml::from_str(&raw).with_context(|| format!("parsing {path}"))?
        }
        None => SimConfig::default(),
    };

    let mut sim = build_instance(&config)?;
    seed_orders(&mut sim);

    info!(
        stations = sim.fleet.station_count(),
        mates = sim.fleet.mate_count(),
        orders = sim.book.total_created(),
        "starting run"
    );
    sim.run(&mut NoopObserver)?;

    report(&sim);
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

fn at(row: u32, col: u32) -> WaypointId {
    WaypointId(row * COLS + col)
}

/// 8×10 grid: stands on the top row, storage block in rows 2-5, resting
/// slots along the bottom row.  The output stand approach is a capacity-2
/// queue zone.
fn build_instance(config: &SimConfig) -> Result<Controller<DijkstraOracle>> {
    let mut b = WaypointGraphBuilder::grid(ROWS, COLS, 1.0);

    for row in 2..6 {
        for col in [2, 3, 6, 7] {
            b.set_storage(at(row, col), format!("S{row}{col}"));
        }
    }
    b.set_queue(at(0, 8), ZoneId(0), Some(at(0, 9)));
    b.set_queue(at(0, 9), ZoneId(0), None);

    let mut graph = b.build();
    let mut pod = 0u32;
    for row in 2..6 {
        for col in [2, 3, 6, 7] {
            graph
                .place_pod(at(row, col), PodId(pod))
                .context("placing pods")?;
            pod += 1;
        }
    }

    // A configured optimizer endpoint swaps the greedy policy for the
    // remote one; everything else is untouched.  The one-time /init call
    // ships the static layout facts before any decision is requested.
    let remote = match &config.optimizer_url {
        Some(url) => {
            let client = OptimizerClient::new(url.clone(), Duration::from_secs(10))
                .context("building optimizer client")?;
            let access_points = graph
                .waypoints
                .iter()
                .filter_map(|w| w.address.clone())
                .map(|a| (a.clone(), a))
                .collect();
            client
                .init(&InitRequest {
                    access_points,
                    bot_ids: (0..3).collect(),
                    picker_ids: (0..2).collect(),
                    bot_speed: 1.5,
                    picker_speed: 1.2,
                })
                .context("optimizer init")?;
            Some(Box::new(RemoteBatching::new(client, config.pending_batch_limit)))
        }
        None => None,
    };

    let stands = PalletStands::new(vec![at(0, 0), at(0, 4)], vec![at(0, 9)]);
    let mut builder = ControllerBuilder::new(config.clone(), graph, stands, DijkstraOracle)
        .stations(vec![at(7, 1), at(7, 4), at(7, 8)], 1.5)
        .mates(vec![at(4, 0), at(4, 9)], 1.2)
        .resting_locations(vec![at(7, 0), at(7, 5), at(7, 9)])
        .zone(ZoneId(0), 2);
    if let Some(policy) = remote {
        builder = builder.policy(policy);
    }

    Ok(builder.build()?)
}

fn seed_orders(sim: &mut Controller<DijkstraOracle>) {
    let picks = [
        vec![("S22", 2, 2), ("S36", 3, 6)],
        vec![("S47", 4, 7)],
        vec![("S53", 5, 3), ("S52", 5, 2), ("S27", 2, 7)],
        vec![("S33", 3, 3)],
        vec![("S46", 4, 6), ("S23", 2, 3)],
    ];
    for (i, order) in picks.iter().enumerate() {
        let lines: Vec<OrderLine> = order
            .iter()
            .map(|&(addr, row, col)| {
                let wp = at(row, col);
                let pod = sim.graph.pod_at(wp).unwrap_or(PodId(0));
                OrderLine::new(addr, wp, pod, 4.0)
            })
            .collect();
        let deadline = Some(SimTime(600.0 + 120.0 * i as f64));
        sim.submit_order(lines, deadline);
    }
}

fn report(sim: &Controller<DijkstraOracle>) {
    let (pending, assigned, completed) = sim.book.partition_counts();
    println!("run finished at {}", sim.clock.now());
    println!("orders: {completed} completed, {assigned} in flight, {pending} pending");
    for s in &sim.fleet.stations {
        println!(
            "  {}: {} orders, {} picks | travel {:.0}s wait {:.0}s idle {:.0}s",
            s.id,
            s.stats.orders_completed,
            s.stats.picks,
            s.stats.travel_secs,
            s.stats.wait_secs,
            s.stats.idle_secs,
        );
    }
    for m in &sim.fleet.mates {
        println!(
            "  {}: {} assists | travel {:.0}s idle {:.0}s",
            m.id, m.stats.assists, m.stats.travel_secs, m.stats.idle_secs,
        );
    }
}
