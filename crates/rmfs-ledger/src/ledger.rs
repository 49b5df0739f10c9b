//! The `ResourceLedger` and its four claim tables.

use rustc_hash::FxHashMap;
use tracing::warn;

use rmfs_core::{ActorId, SimRng, WaypointId, ZoneId};

use crate::{LedgerError, LedgerResult};

// ── Zone semaphore ────────────────────────────────────────────────────────────

/// Counted admission to a protected zone: at most `capacity` concurrent
/// occupants.
#[derive(Clone, Debug)]
struct ZoneSemaphore {
    capacity:  u32,
    occupancy: u32,
}

// ── ResourceLedger ────────────────────────────────────────────────────────────

/// Reservation ledger over the warehouse's exclusive resources.
///
/// | Table             | Exclusivity                               |
/// |-------------------|-------------------------------------------|
/// | position locks    | one holder per waypoint                   |
/// | resting pool      | a slot is free xor claimed by one agent   |
/// | zone semaphores   | at most N concurrent occupants per zone   |
/// | stand inbound     | soft counter, drives congestion balancing |
///
/// A waypoint is never simultaneously a locked position and a claimed
/// resting slot for two different agents: the two tables are keyed by the
/// same `WaypointId` space and the construction wiring keeps rendezvous
/// waypoints and resting slots disjoint.
#[derive(Default)]
pub struct ResourceLedger {
    /// Exclusive rendezvous/position locks: waypoint → holder.
    locked: FxHashMap<WaypointId, ActorId>,

    /// Idle-parking slots still available.
    resting_free: Vec<WaypointId>,

    /// Idle-parking slots currently claimed: waypoint → claimant.
    resting_claimed: FxHashMap<WaypointId, ActorId>,

    /// Admission semaphores keyed by zone.
    zones: FxHashMap<ZoneId, ZoneSemaphore>,

    /// Inbound-agent counters per pallet stand.
    stand_inbound: FxHashMap<WaypointId, u32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    /// Seed the free resting pool.  Called once at construction.
    pub fn seed_resting_pool(&mut self, slots: impl IntoIterator<Item = WaypointId>) {
        self.resting_free.extend(slots);
    }

    /// Register a queue zone admitting at most `capacity` occupants.
    pub fn register_zone(&mut self, zone: ZoneId, capacity: u32) {
        self.zones.insert(zone, ZoneSemaphore { capacity, occupancy: 0 });
    }

    // ── Resting pool ──────────────────────────────────────────────────────

    /// Remove and return one free resting slot, chosen uniformly at random.
    ///
    /// No ordering guarantee beyond "some free slot".  Returns `None` when
    /// the pool is exhausted — the caller stays idle and retries later, this
    /// is not an error.
    pub fn claim_resting(&mut self, claimant: ActorId, rng: &mut SimRng) -> Option<WaypointId> {
        let idx = rng.choose_index(self.resting_free.len())?;
        let slot = self.resting_free.swap_remove(idx);
        self.resting_claimed.insert(slot, claimant);
        Some(slot)
    }

    /// Claim a specific slot if it is still in the free pool.
    ///
    /// Used to give an agent back its previous resting place.
    pub fn claim_resting_exact(&mut self, slot: WaypointId, claimant: ActorId) -> bool {
        match self.resting_free.iter().position(|&w| w == slot) {
            Some(idx) => {
                self.resting_free.swap_remove(idx);
                self.resting_claimed.insert(slot, claimant);
                true
            }
            None => false,
        }
    }

    /// Return `slot` to the free pool.
    ///
    /// Releasing a slot that was never claimed is a logged no-op.
    pub fn release_resting(&mut self, slot: WaypointId) {
        if self.resting_claimed.remove(&slot).is_some() {
            self.resting_free.push(slot);
        } else {
            warn!(%slot, "release of unclaimed resting slot ignored");
        }
    }

    /// Who has claimed `slot`, if anyone.
    pub fn resting_claimant(&self, slot: WaypointId) -> Option<ActorId> {
        self.resting_claimed.get(&slot).copied()
    }

    pub fn resting_free_len(&self) -> usize {
        self.resting_free.len()
    }

    // ── Position locks ────────────────────────────────────────────────────

    /// Exclusively lock `waypoint` for `holder`.
    ///
    /// A second lock on an already-locked waypoint is a coordination bug and
    /// is reported to the caller — it must never silently overwrite.
    /// Re-locking by the same holder is accepted (refreshing a reservation).
    pub fn lock_position(&mut self, waypoint: WaypointId, holder: ActorId) -> LedgerResult<()> {
        match self.locked.get(&waypoint) {
            Some(&prior) if prior != holder => {
                Err(LedgerError::AlreadyLocked { waypoint, holder, prior })
            }
            _ => {
                self.locked.insert(waypoint, holder);
                Ok(())
            }
        }
    }

    /// Release the lock on `waypoint`.  No-op if it was not locked.
    pub fn free_position(&mut self, waypoint: WaypointId) {
        if self.locked.remove(&waypoint).is_none() {
            warn!(%waypoint, "release of unlocked position ignored");
        }
    }

    pub fn is_locked(&self, waypoint: WaypointId) -> bool {
        self.locked.contains_key(&waypoint)
    }

    pub fn lock_holder(&self, waypoint: WaypointId) -> Option<ActorId> {
        self.locked.get(&waypoint).copied()
    }

    // ── Zone semaphores ───────────────────────────────────────────────────

    /// Try to admit one occupant to `zone`.
    ///
    /// Returns `false` while the zone is full — the agent holds its position
    /// and retries on a later pass.  Unregistered zones error: admission to
    /// an unbounded zone would silently void the protection.
    pub fn try_enter_zone(&mut self, zone: ZoneId) -> LedgerResult<bool> {
        let sem = self.zones.get_mut(&zone).ok_or(LedgerError::UnknownZone(zone))?;
        if sem.occupancy < sem.capacity {
            sem.occupancy += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Leave `zone`.  Exit always succeeds; the count saturates at zero.
    pub fn leave_zone(&mut self, zone: ZoneId) {
        match self.zones.get_mut(&zone) {
            Some(sem) if sem.occupancy > 0 => sem.occupancy -= 1,
            Some(_) => warn!(%zone, "zone exit with zero occupancy ignored"),
            None => warn!(%zone, "exit from unregistered zone ignored"),
        }
    }

    pub fn zone_occupancy(&self, zone: ZoneId) -> Option<u32> {
        self.zones.get(&zone).map(|s| s.occupancy)
    }

    // ── Stand inbound counters ────────────────────────────────────────────

    /// Record one more agent heading for `stand`.
    pub fn note_inbound(&mut self, stand: WaypointId) {
        *self.stand_inbound.entry(stand).or_insert(0) += 1;
    }

    /// Remove one inbound registration for `stand` (arrival or abort).
    /// Saturates at zero; an unbalanced clear is logged.
    pub fn clear_inbound(&mut self, stand: WaypointId) {
        match self.stand_inbound.get_mut(&stand) {
            Some(n) if *n > 0 => *n -= 1,
            _ => warn!(%stand, "inbound clear without matching note ignored"),
        }
    }

    /// How many agents are currently en route to `stand`.
    pub fn inbound(&self, stand: WaypointId) -> u32 {
        self.stand_inbound.get(&stand).copied().unwrap_or(0)
    }

    // ── Audit ─────────────────────────────────────────────────────────────

    /// Every claim currently held by `holder` — locked positions and resting
    /// slots.  Intended for invariant audits in tests and teardown checks.
    pub fn claims_of(&self, holder: ActorId) -> Vec<WaypointId> {
        let locks = self
            .locked
            .iter()
            .filter(|&(_, &h)| h == holder)
            .map(|(&w, _)| w);
        let rests = self
            .resting_claimed
            .iter()
            .filter(|&(_, &h)| h == holder)
            .map(|(&w, _)| w);
        locks.chain(rests).collect()
    }

    /// Total outstanding inbound registrations across all stands.
    pub fn total_inbound(&self) -> u32 {
        self.stand_inbound.values().sum()
    }
}
