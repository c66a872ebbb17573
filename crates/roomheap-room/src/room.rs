//! A capacity-bounded group of players with a cached score.

use std::collections::HashMap;

use roomheap_protocol::{Player, PlayerId, RoomId, RoomSnapshot};

use crate::score::score;
use crate::{LifecycleState, StatePenalties};

/// One room: its occupants, lifecycle state, and the score derived from
/// both.
///
/// `score` is never set directly. Every method that changes occupants or
/// state recomputes it, so it always equals
/// `score(len, capacity, penalty(state))`.
///
/// `slot` belongs to [`RoomQueue`](crate::RoomQueue). It is `Some(i)`
/// while the room sits at position `i` of the queue's storage and `None`
/// while a caller holds the room checked out.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    capacity: usize,
    occupants: HashMap<PlayerId, Player>,
    state: LifecycleState,
    score: f64,
    pub(crate) slot: Option<usize>,
}

impl Room {
    /// Creates an empty, idle room outside any queue.
    ///
    /// `capacity` must be positive; [`RoomAllocator::initialize`](crate::RoomAllocator::initialize)
    /// checks this before building rooms.
    pub fn new(id: RoomId, capacity: usize, penalties: &StatePenalties) -> Self {
        let state = LifecycleState::Idle;
        Self {
            id,
            capacity,
            occupants: HashMap::new(),
            state,
            score: score(0, capacity, penalties.penalty(state)),
            slot: None,
        }
    }

    /// Places `player` in the room, keyed by id, and recomputes the score.
    ///
    /// Returns `false` and leaves the room untouched when the room is
    /// full and `player` is not already an occupant. A player who is
    /// already here is overwritten (last write wins) and counts as
    /// admitted.
    ///
    /// Only call this on a room that is checked out of its queue, or
    /// through [`RoomQueue::update`](crate::RoomQueue::update), which
    /// re-fixes the heap afterwards.
    pub fn try_admit(&mut self, player: &Player, penalties: &StatePenalties) -> bool {
        if self.is_full() && !self.occupants.contains_key(&player.id) {
            return false;
        }
        self.occupants.insert(player.id, player.clone());
        self.refresh_score(penalties);
        true
    }

    /// Replaces the lifecycle state and recomputes the score.
    pub fn set_state(&mut self, state: LifecycleState, penalties: &StatePenalties) {
        self.state = state;
        self.refresh_score(penalties);
    }

    fn refresh_score(&mut self, penalties: &StatePenalties) {
        self.score = score(
            self.occupants.len(),
            self.capacity,
            penalties.penalty(self.state),
        );
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of occupants.
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.occupants.contains_key(&player_id)
    }

    /// Occupants in no particular order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.occupants.values()
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Whether the queue may hand this room out. NaN counts as no.
    pub fn is_allocatable(&self) -> bool {
        self.score > 0.0
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Position in the queue's storage, or `None` while checked out.
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    /// A read-only copy of this room for diagnostics and export.
    pub fn snapshot(&self) -> RoomSnapshot {
        let mut players: Vec<PlayerId> = self.occupants.keys().copied().collect();
        players.sort();
        RoomSnapshot {
            id: self.id,
            capacity: self.capacity,
            players,
            score: self.score,
            state: self.state.to_string(),
            slot: self.slot,
        }
    }
}
