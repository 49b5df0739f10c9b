//! The per-agent state queue.

use std::collections::VecDeque;

use rmfs_core::WaypointId;
use rmfs_ledger::ResourceLedger;

use crate::lookahead::LookaheadClass;
use crate::state::State;

/// Ordered remaining plan of one agent.
///
/// The queue is the only owner of pending states, and this API is the only
/// way to mutate it: normal progress pops the head, task replacement drains
/// everything, aborts truncate the tail.  Every discard path funnels through
/// [`State::release_on_discard`], which is what keeps resource claims from
/// leaking when plans die early.
#[derive(Debug, Default, Clone)]
pub struct StateQueue {
    inner: VecDeque<State>,
}

impl StateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // ── FIFO surface ──────────────────────────────────────────────────────

    pub fn push_back(&mut self, state: State) {
        self.inner.push_back(state);
    }

    pub fn extend(&mut self, states: impl IntoIterator<Item = State>) {
        self.inner.extend(states);
    }

    /// Place a redirect state ahead of the current head.
    pub fn push_front(&mut self, state: State) {
        self.inner.push_front(state);
    }

    /// Pop the completed head.  Normal-progress mutation; no claim release.
    pub fn pop_front(&mut self) -> Option<State> {
        self.inner.pop_front()
    }

    pub fn front(&self) -> Option<&State> {
        self.inner.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut State> {
        self.inner.front_mut()
    }

    /// The state after the head, if any.
    pub fn peek_second(&self) -> Option<&State> {
        self.inner.get(1)
    }

    pub fn get(&self, idx: usize) -> Option<&State> {
        self.inner.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    // ── Lookahead ─────────────────────────────────────────────────────────

    /// The waypoint of the next rendezvous state beyond the `registered`
    /// already-covered ones.
    ///
    /// Walks the queue and counts `Rendezvous`-class states, skipping
    /// motion, service, and redirect states per
    /// [`StateKind::lookahead_class`][crate::StateKind::lookahead_class].
    /// Returns `None` when fewer than `registered + 1` rendezvous states
    /// remain.
    pub fn location_after(&self, registered: usize) -> Option<WaypointId> {
        self.inner
            .iter()
            .filter(|s| s.kind().lookahead_class() == LookaheadClass::Rendezvous)
            .nth(registered)
            .map(|s| s.destination())
    }

    /// Flag the first unlocked rendezvous state at `at` as holding a ledger
    /// position lock, so a later discard returns it.
    ///
    /// Returns `false` if no such state exists (the lock holder should then
    /// free the position itself).
    pub fn mark_rendezvous_locked(&mut self, at: WaypointId) -> bool {
        for state in self.inner.iter_mut() {
            match state {
                State::WaitingForMate { at: wp, locked }
                | State::WaitingForSeeOff { at: wp, locked }
                    if *wp == at && !*locked =>
                {
                    *locked = true;
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    // ── Discard paths ─────────────────────────────────────────────────────

    /// Drop the whole remaining plan, returning every claim to the ledger.
    pub fn discard_all(&mut self, ledger: &mut ResourceLedger) {
        for state in self.inner.drain(..) {
            state.release_on_discard(ledger);
        }
    }

    /// Drop states from position `from` to the tail, returning their claims.
    /// The head (`from == 0`) may be kept to let an in-flight state finish.
    pub fn truncate_from(&mut self, from: usize, ledger: &mut ResourceLedger) {
        while self.inner.len() > from {
            if let Some(state) = self.inner.pop_back() {
                state.release_on_discard(ledger);
            }
        }
    }
}

impl FromIterator<State> for StateQueue {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}
