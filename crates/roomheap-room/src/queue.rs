//! Array-backed binary max-heap of rooms, ordered by score.
//!
//! Every room carries its own storage position in [`Room::slot`]. The
//! queue rewrites that field on every swap, push and pop so a resident
//! room can be re-heapified in O(log n) after its score changes
//! ([`RoomQueue::fix`]).
//!
//! Ownership does most of the "checked out" bookkeeping: [`RoomQueue::pop_top`]
//! hands the room out by value, so while a caller holds it nobody else can
//! reach it, and [`RoomQueue::push_back`] takes it back by value.

use roomheap_protocol::{RoomId, RoomSnapshot};

use crate::{Room, RoomError};

/// A broken queue invariant, reported by [`RoomQueue::check_invariants`].
///
/// These never surface from allocation. They exist so tests (and
/// paranoid callers) can prove the heap and the slot fields agree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// A resident room's `slot` does not match where it is stored.
    #[error("room {room_id} stored at {actual} but records slot {recorded:?}")]
    SlotMismatch {
        room_id: RoomId,
        actual: usize,
        recorded: Option<usize>,
    },

    /// A child outranks its parent.
    #[error("heap order broken: child {child} (score {child_score}) above parent {parent} (score {parent_score})")]
    HeapOrder {
        parent: usize,
        child: usize,
        parent_score: f64,
        child_score: f64,
    },
}

/// Binary max-heap of [`Room`]s keyed by score (highest first).
///
/// Ties: rooms with equal scores come out in whatever order the sift
/// operations leave them. That order depends on insertion history and is
/// not guaranteed to be stable.
#[derive(Debug, Default)]
pub struct RoomQueue {
    rooms: Vec<Room>,
}

impl RoomQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self { rooms: Vec::new() }
    }

    /// Builds a queue from `rooms` in O(n) with a bottom-up heapify.
    pub fn from_rooms(rooms: Vec<Room>) -> Self {
        let mut queue = Self { rooms };
        for (i, room) in queue.rooms.iter_mut().enumerate() {
            room.slot = Some(i);
        }
        for i in (0..queue.rooms.len() / 2).rev() {
            queue.sift_down(i);
        }
        queue
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// The highest-scoring room, without removing it.
    pub fn peek(&self) -> Option<&Room> {
        self.rooms.first()
    }

    /// Removes and returns the highest-scoring room.
    ///
    /// The returned room has `slot == None` until it is pushed back.
    ///
    /// # Errors
    /// - [`RoomError::EmptyQueue`] if there are no rooms.
    /// - [`RoomError::NoAllocatableRoom`] if the best room scores zero or
    ///   below. The queue is left untouched in that case.
    pub fn pop_top(&mut self) -> Result<Room, RoomError> {
        let top = self.rooms.first().ok_or(RoomError::EmptyQueue)?;
        if !top.is_allocatable() {
            return Err(RoomError::NoAllocatableRoom);
        }

        let mut room = self.rooms.swap_remove(0);
        room.slot = None;
        if let Some(moved) = self.rooms.first_mut() {
            moved.slot = Some(0);
            self.sift_down(0);
        }
        Ok(room)
    }

    /// Returns a checked-out room to the queue and restores heap order.
    ///
    /// Must be paired with exactly one earlier [`pop_top`](Self::pop_top)
    /// of the same room (or be the room's first insertion).
    pub fn push_back(&mut self, mut room: Room) -> usize {
        debug_assert!(room.slot.is_none(), "room {} is already resident", room.id());
        let slot = self.rooms.len();
        room.slot = Some(slot);
        self.rooms.push(room);
        self.sift_up(slot)
    }

    /// Re-establishes heap order for the room at `slot` after its score
    /// changed in place. Returns the room's new slot, or `None` if `slot`
    /// is out of range.
    pub fn fix(&mut self, slot: usize) -> Option<usize> {
        if slot >= self.rooms.len() {
            return None;
        }
        let up = self.sift_up(slot);
        if up != slot {
            return Some(up);
        }
        Some(self.sift_down(slot))
    }

    /// Mutates the resident room `room_id` and re-fixes the heap.
    ///
    /// Returns `None` if no such room is resident. Lookup is a linear
    /// scan over storage.
    pub fn update<R>(&mut self, room_id: RoomId, f: impl FnOnce(&mut Room) -> R) -> Option<R> {
        let slot = self.position(room_id)?;
        let out = f(&mut self.rooms[slot]);
        self.fix(slot);
        Some(out)
    }

    /// Storage position of the resident room `room_id`.
    pub fn position(&self, room_id: RoomId) -> Option<usize> {
        self.rooms.iter().position(|r| r.id() == room_id)
    }

    pub fn get(&self, room_id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id() == room_id)
    }

    /// Resident rooms in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Snapshots of every resident room in storage order.
    pub fn snapshot(&self) -> Vec<RoomSnapshot> {
        self.rooms.iter().map(Room::snapshot).collect()
    }

    /// Verifies slot bookkeeping and heap order.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (i, room) in self.rooms.iter().enumerate() {
            if room.slot != Some(i) {
                return Err(InvariantViolation::SlotMismatch {
                    room_id: room.id(),
                    actual: i,
                    recorded: room.slot,
                });
            }
            if i > 0 {
                let parent = (i - 1) / 2;
                if self.higher(i, parent) {
                    return Err(InvariantViolation::HeapOrder {
                        parent,
                        child: i,
                        parent_score: self.rooms[parent].score(),
                        child_score: room.score(),
                    });
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Heap internals
    // -----------------------------------------------------------------

    fn higher(&self, i: usize, j: usize) -> bool {
        self.rooms[i].score() > self.rooms[j].score()
    }

    /// Swaps two storage slots and rewrites both rooms' `slot` fields.
    fn swap(&mut self, i: usize, j: usize) {
        self.rooms.swap(i, j);
        self.rooms[i].slot = Some(i);
        self.rooms[j].slot = Some(j);
    }

    fn sift_up(&mut self, mut i: usize) -> usize {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.higher(i, parent) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
        i
    }

    fn sift_down(&mut self, mut i: usize) -> usize {
        let n = self.rooms.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let mut best = left;
            if right < n && self.higher(right, left) {
                best = right;
            }
            if !self.higher(best, i) {
                break;
            }
            self.swap(i, best);
            i = best;
        }
        i
    }
}
