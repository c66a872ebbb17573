//! The allocation coordinator: one lock around the room queue.
//!
//! Every allocation runs the same sequence while holding the lock:
//!
//! ```text
//! lock → pop_top → try_admit → push_back → unlock
//! ```
//!
//! The lock is a synchronous `parking_lot::Mutex`. Its guard cannot be
//! held across an `.await`, so nothing in the critical section can
//! suspend. Callers that want to simulate slow clients must sleep before
//! calling [`RoomAllocator::allocate`], never inside it.

use std::sync::Arc;

use parking_lot::Mutex;
use roomheap_protocol::{Player, RoomId, RoomSnapshot};

use crate::queue::InvariantViolation;
use crate::{LifecycleState, Room, RoomError, RoomQueue, RoomSpec, StatePenalties};

/// Hook for watching rooms leave and re-enter the queue.
///
/// Both methods run while the allocator's lock is held, so they must be
/// quick and must not call back into the allocator.
pub trait CheckoutObserver: Send + Sync + 'static {
    /// A room was popped for an allocation attempt.
    fn on_checkout(&self, _room_id: RoomId) {}

    /// The room was pushed back into the queue.
    fn on_checkin(&self, _room_id: RoomId) {}
}

/// Shares one [`RoomQueue`] between any number of concurrent callers.
///
/// `RoomAllocator` is `Send + Sync`; wrap it in an `Arc` and call
/// [`allocate`](Self::allocate) from as many threads or tasks as needed.
pub struct RoomAllocator {
    queue: Mutex<RoomQueue>,
    penalties: StatePenalties,
    room_count: usize,
    observer: Option<Arc<dyn CheckoutObserver>>,
}

impl RoomAllocator {
    /// Builds one idle, empty room per spec and heapifies them.
    ///
    /// Rooms get ids `R-0`, `R-1`, ... in spec order. An empty `specs`
    /// is accepted; every `allocate` on the result returns
    /// [`RoomError::EmptyQueue`].
    ///
    /// # Errors
    /// - [`RoomError::InvalidCapacity`] if any spec has capacity 0.
    /// - [`RoomError::InvalidConfig`] if `penalties` fails validation.
    pub fn initialize(specs: &[RoomSpec], penalties: StatePenalties) -> Result<Self, RoomError> {
        let penalties = penalties.validated()?;

        let mut rooms = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            if spec.capacity == 0 {
                return Err(RoomError::InvalidCapacity { index });
            }
            rooms.push(Room::new(RoomId(index as u64), spec.capacity, &penalties));
        }

        let queue = RoomQueue::from_rooms(rooms);
        let room_count = queue.len();
        tracing::info!(rooms = room_count, "room queue initialized");

        Ok(Self {
            queue: Mutex::new(queue),
            penalties,
            room_count,
            observer: None,
        })
    }

    /// Attaches a [`CheckoutObserver`].
    pub fn with_observer(mut self, observer: Arc<dyn CheckoutObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Places `player` in the best-scoring room and returns its id.
    ///
    /// # Errors
    /// - [`RoomError::EmptyQueue`] if the allocator holds no rooms.
    /// - [`RoomError::NoAllocatableRoom`] if no room currently scores
    ///   above zero. The queue is left exactly as it was.
    pub fn allocate(&self, player: &Player) -> Result<RoomId, RoomError> {
        let mut queue = self.queue.lock();

        let mut room = match queue.pop_top() {
            Ok(room) => room,
            Err(RoomError::EmptyQueue) => {
                tracing::error!(player_id = %player.id, "allocation against an empty room queue");
                return Err(RoomError::EmptyQueue);
            }
            Err(e) => {
                tracing::debug!(player_id = %player.id, error = %e, "allocation declined");
                return Err(e);
            }
        };
        let room_id = room.id();
        self.notify_checkout(room_id);

        let admitted = room.try_admit(player, &self.penalties);
        let score = room.score();
        let occupants = room.len();

        queue.push_back(room);
        self.notify_checkin(room_id);
        drop(queue);

        if !admitted {
            tracing::debug!(player_id = %player.id, %room_id, "room refused admission");
            return Err(RoomError::NoAllocatableRoom);
        }

        tracing::debug!(
            player_id = %player.id,
            %room_id,
            occupants,
            score,
            "player allocated"
        );
        Ok(room_id)
    }

    /// Moves a room to a new lifecycle state and re-fixes its position.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no room has this id.
    pub fn set_state(&self, room_id: RoomId, state: LifecycleState) -> Result<(), RoomError> {
        let mut queue = self.queue.lock();
        queue
            .update(room_id, |room| room.set_state(state, &self.penalties))
            .ok_or(RoomError::NotFound(room_id))?;
        tracing::info!(%room_id, %state, "room state changed");
        Ok(())
    }

    /// Number of rooms created at startup. Constant for the allocator's life.
    pub fn room_count(&self) -> usize {
        self.room_count
    }

    /// The penalty table every score is computed with.
    pub fn penalties(&self) -> &StatePenalties {
        &self.penalties
    }

    /// Snapshot of one room.
    pub fn room(&self, room_id: RoomId) -> Option<RoomSnapshot> {
        self.queue.lock().get(room_id).map(Room::snapshot)
    }

    /// Snapshots of every room, in queue storage order.
    pub fn snapshot(&self) -> Vec<RoomSnapshot> {
        self.queue.lock().snapshot()
    }

    /// Checks heap order and slot bookkeeping under the lock.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.queue.lock().check_invariants()
    }

    fn notify_checkout(&self, room_id: RoomId) {
        if let Some(observer) = &self.observer {
            observer.on_checkout(room_id);
        }
    }

    fn notify_checkin(&self, room_id: RoomId) {
        if let Some(observer) = &self.observer {
            observer.on_checkin(room_id);
        }
    }
}

impl std::fmt::Debug for RoomAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomAllocator")
            .field("room_count", &self.room_count)
            .field("penalties", &self.penalties)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}
