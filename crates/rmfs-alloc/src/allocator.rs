//! The task allocator.

use tracing::debug;

use rmfs_agent::{Drivable, MateState, StationState, Tasked};
use rmfs_core::{ActorId, SimConfig, WaypointId};
use rmfs_layout::StandKind;
use rmfs_order::OrderBook;
use rmfs_task::{GatherStop, GatherTask, State, StateKind, Task};

use crate::ctx::AllocCtx;
use crate::AllocResult;

/// Decides the next task of an idle agent.
pub struct TaskAllocator {
    input_margin: u32,
    output_margin: u32,
    see_off: bool,
    self_assist: bool,
}

impl TaskAllocator {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            input_margin: config.input_stand_margin,
            output_margin: config.output_stand_margin,
            see_off: config.see_off_scheduling,
            self_assist: config.bots_self_assist,
        }
    }

    // ── Stations ──────────────────────────────────────────────────────────

    /// Give an idle station its next task.
    ///
    /// With a bound order: a gather plan through the order's open lines.
    /// Without: rest.  Returns `true` when a task (gather or rest) was
    /// assigned, `false` when the station stays idle.
    pub fn next_station_task(
        &self,
        station: &mut StationState,
        book: &OrderBook,
        ctx: &mut AllocCtx<'_>,
    ) -> AllocResult<bool> {
        // First bound order that still has something to pick.
        let order_id = station
            .capacity
            .assigned
            .iter()
            .copied()
            .find(|&o| book.order(o).map(|o| o.first_open().is_some()).unwrap_or(false));

        let Some(order_id) = order_id else {
            return Ok(self.send_station_to_rest(station, ctx));
        };

        let order = book.order(order_id)?;
        let stops: Vec<GatherStop> = order
            .open_lines()
            .map(|line| GatherStop {
                location: line.location,
                pod: line.pod,
                address: line.address.clone(),
                service_secs: line.service_secs,
            })
            .collect();
        let resuming = order.is_partial();

        // Old plan (and its claims) out before new claims are taken.
        let was_rest = station.task.is_rest();
        station.assign_task(
            Task::MultiPointGather(GatherTask::new(order_id, stops.clone())),
            ctx.ledger,
        );
        if was_rest {
            station.last_completed = Some(StateKind::Rest);
        }

        let mut states = Vec::with_capacity(stops.len() * 2 + 4);
        let mut from = station.at();

        if resuming {
            states.push(State::PreparePartialTask { at: from });
        }
        if !station.carrying_pallet {
            if let Some(stand) = self.choose_stand(StandKind::Input, from, station.speed_mps, ctx)
            {
                states.push(State::Move { to: stand });
                states.push(State::GetPallet { stand });
                from = stand;
            }
        }
        for stop in &stops {
            states.push(State::Move { to: stop.location });
            states.push(if self.self_assist {
                State::PickItem { at: stop.location }
            } else if self.see_off {
                State::WaitingForSeeOff { at: stop.location, locked: false }
            } else {
                State::WaitingForMate { at: stop.location, locked: false }
            });
            from = stop.location;
        }
        if let Some(stand) = self.choose_stand(StandKind::Output, from, station.speed_mps, ctx) {
            states.push(State::Move { to: stand });
            states.push(State::PutPallet { stand });
        }

        station.queue.extend(states);
        debug!(station = %station.id, order = %order_id, stops = stops.len(), "gather task assigned");
        Ok(true)
    }

    /// Park an idle station at a resting slot.  Returns `false` (station
    /// stays idle, task `None`) when no slot is free.
    pub fn send_station_to_rest(&self, station: &mut StationState, ctx: &mut AllocCtx<'_>) -> bool {
        let came_from_rest = matches!(station.last_completed, Some(StateKind::Rest))
            || station.task.is_rest();
        let slot = rest_slot(
            ActorId::Station(station.id),
            station.last_rest,
            came_from_rest,
            ctx,
        );
        let Some(slot) = slot else {
            station.assign_task(Task::None, ctx.ledger);
            return false;
        };
        let was_rest = station.task.is_rest();
        station.assign_task(Task::Rest { at: slot }, ctx.ledger);
        if was_rest {
            station.last_completed = Some(StateKind::Rest);
        }
        if !station.movement.is_at(slot) {
            station.queue.push_back(State::Move { to: slot });
        }
        station.queue.push_back(State::Rest { at: slot });
        station.last_rest = Some(slot);
        station.stats.rests += 1;
        true
    }

    // ── Mates ─────────────────────────────────────────────────────────────

    /// Park an idle mate at a resting slot; same policy as stations.
    pub fn send_mate_to_rest(&self, mate: &mut MateState, ctx: &mut AllocCtx<'_>) -> bool {
        let came_from_rest =
            matches!(mate.last_completed, Some(StateKind::Rest)) || mate.task.is_rest();
        let slot = rest_slot(ActorId::Mate(mate.id), mate.last_rest, came_from_rest, ctx);
        let Some(slot) = slot else {
            mate.assign_task(Task::None, ctx.ledger);
            return false;
        };
        let was_rest = mate.task.is_rest();
        mate.assign_task(Task::Rest { at: slot }, ctx.ledger);
        if was_rest {
            mate.last_completed = Some(StateKind::Rest);
        }
        if !mate.movement.is_at(slot) {
            mate.queue.push_back(State::Move { to: slot });
        }
        mate.queue.push_back(State::Rest { at: slot });
        mate.last_rest = Some(slot);
        mate.stats.rests += 1;
        true
    }

    // ── Stand choice ──────────────────────────────────────────────────────

    /// Pick a pallet stand for an agent at `from` and register the inbound
    /// trip.
    ///
    /// Nearest stand by predicted travel wins, unless some other stand's
    /// inbound counter is lower by at least the margin for this kind — then
    /// the least-congested of those wins.
    fn choose_stand(
        &self,
        kind: StandKind,
        from: WaypointId,
        speed_mps: f64,
        ctx: &mut AllocCtx<'_>,
    ) -> Option<WaypointId> {
        let candidates = ctx.stands.of_kind(kind);
        let margin = match kind {
            StandKind::Input => self.input_margin,
            StandKind::Output => self.output_margin,
        };

        let mut closest: Option<(WaypointId, f64)> = None;
        for &stand in candidates {
            let Ok(secs) = ctx.oracle.travel_secs(ctx.graph, from, stand, speed_mps) else {
                continue;
            };
            if closest.is_none_or(|(_, best)| secs < best) {
                closest = Some((stand, secs));
            }
        }
        let (closest, _) = closest?;

        let closest_inbound = ctx.ledger.inbound(closest);
        let mut chosen = closest;
        let mut chosen_inbound = closest_inbound;
        for &stand in candidates {
            let inbound = ctx.ledger.inbound(stand);
            if closest_inbound.saturating_sub(inbound) >= margin && inbound < chosen_inbound {
                chosen = stand;
                chosen_inbound = inbound;
            }
        }

        ctx.ledger.note_inbound(chosen);
        debug!(?kind, %chosen, inbound = chosen_inbound, "stand selected");
        Some(chosen)
    }
}

/// Resting slot for an agent: its previous slot when it came straight from
/// resting and the slot is still free, otherwise a random free one.
fn rest_slot(
    actor: ActorId,
    last_rest: Option<WaypointId>,
    came_from_rest: bool,
    ctx: &mut AllocCtx<'_>,
) -> Option<WaypointId> {
    if came_from_rest {
        if let Some(slot) = last_rest {
            if ctx.ledger.claim_resting_exact(slot, actor) {
                return Some(slot);
            }
        }
    }
    ctx.ledger.claim_resting(actor, ctx.rng)
}
