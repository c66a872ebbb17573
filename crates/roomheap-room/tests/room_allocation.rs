//! Integration tests for the allocator under contention.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;
use roomheap_protocol::{Player, PlayerId, RoomId};
use roomheap_room::{
    CheckoutObserver, LifecycleState, RoomAllocator, RoomError, RoomSpec, StatePenalties,
};

// =========================================================================
// Instrumentation
// =========================================================================

/// Records every checkout and flags any room checked out twice at once.
#[derive(Default)]
struct CheckoutLedger {
    out: Mutex<HashSet<RoomId>>,
    max_out: AtomicUsize,
    double_checkouts: AtomicUsize,
    stray_checkins: AtomicUsize,
    checkouts: AtomicUsize,
}

impl CheckoutObserver for CheckoutLedger {
    fn on_checkout(&self, room_id: RoomId) {
        let mut out = self.out.lock();
        if !out.insert(room_id) {
            self.double_checkouts.fetch_add(1, Ordering::SeqCst);
        }
        self.max_out.fetch_max(out.len(), Ordering::SeqCst);
        self.checkouts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_checkin(&self, room_id: RoomId) {
        if !self.out.lock().remove(&room_id) {
            self.stray_checkins.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn player(id: u64) -> Player {
    Player::at(PlayerId(id), format!("Player#{id}"), 0)
}

fn allocator(rooms: usize, capacity: usize) -> RoomAllocator {
    RoomAllocator::initialize(&RoomSpec::uniform(rooms, capacity), StatePenalties::default())
        .unwrap()
}

// =========================================================================
// Concurrency
// =========================================================================

#[test]
fn test_concurrent_allocations_never_share_a_checkout() {
    let ledger = Arc::new(CheckoutLedger::default());
    let alloc = Arc::new(allocator(5, 4).with_observer(ledger.clone()));

    let threads = 16;
    let per_thread = 25;
    let successes = AtomicUsize::new(0);
    let declines = AtomicUsize::new(0);

    thread::scope(|s| {
        for t in 0..threads {
            let alloc = &alloc;
            let successes = &successes;
            let declines = &declines;
            s.spawn(move || {
                for i in 0..per_thread {
                    let id = (t * per_thread + i) as u64;
                    match alloc.allocate(&player(id)) {
                        Ok(_) => successes.fetch_add(1, Ordering::SeqCst),
                        Err(RoomError::NoAllocatableRoom) => declines.fetch_add(1, Ordering::SeqCst),
                        Err(e) => panic!("unexpected error: {e}"),
                    };
                }
            });
        }
    });

    assert_eq!(ledger.double_checkouts.load(Ordering::SeqCst), 0);
    assert_eq!(ledger.stray_checkins.load(Ordering::SeqCst), 0);
    assert_eq!(ledger.max_out.load(Ordering::SeqCst), 1);
    assert!(ledger.out.lock().is_empty());

    let ok = successes.load(Ordering::SeqCst);
    let declined = declines.load(Ordering::SeqCst);
    assert_eq!(ok + declined, threads * per_thread);
    // Declines never reach the checkout stage.
    assert_eq!(ledger.checkouts.load(Ordering::SeqCst), ok);
    alloc.check_invariants().unwrap();
}

#[test]
fn test_concurrent_allocations_fill_every_seat_exactly() {
    let alloc = Arc::new(allocator(5, 4));
    let placed: Mutex<Vec<(PlayerId, RoomId)>> = Mutex::new(Vec::new());

    thread::scope(|s| {
        for t in 0..10u64 {
            let alloc = &alloc;
            let placed = &placed;
            s.spawn(move || {
                for i in 0..10u64 {
                    let p = player(t * 10 + i);
                    if let Ok(room) = alloc.allocate(&p) {
                        placed.lock().push((p.id, room));
                    }
                }
            });
        }
    });

    // 5 rooms × 4 seats; a full room scores 0 and is never handed out.
    let placed = placed.into_inner();
    assert_eq!(placed.len(), 20);

    let rooms = alloc.snapshot();
    let seated: usize = rooms.iter().map(|r| r.player_count()).sum();
    assert_eq!(seated, placed.len());
    for room in &rooms {
        assert!(room.player_count() <= room.capacity);
    }
    for (pid, rid) in placed {
        let snap = alloc.room(rid).unwrap();
        assert!(snap.players.contains(&pid), "{pid} missing from {rid}");
    }
    alloc.check_invariants().unwrap();
}

#[test]
fn test_size_is_conserved_under_contention() {
    let alloc = Arc::new(allocator(7, 6));

    thread::scope(|s| {
        for t in 0..8u64 {
            let alloc = &alloc;
            s.spawn(move || {
                for i in 0..20u64 {
                    let _ = alloc.allocate(&player(t * 100 + i));
                }
            });
        }
        let alloc = &alloc;
        s.spawn(move || {
            for round in 0..20u64 {
                let state = if round % 2 == 0 {
                    LifecycleState::InBattle
                } else {
                    LifecycleState::Waiting
                };
                alloc.set_state(RoomId(round % 7), state).unwrap();
            }
        });
    });

    assert_eq!(alloc.snapshot().len(), 7);
    assert_eq!(alloc.room_count(), 7);
    alloc.check_invariants().unwrap();
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_single_room_admits_two_players_in_turn() {
    let alloc = allocator(1, 4);

    assert_eq!(alloc.allocate(&player(1)), Ok(RoomId(0)));
    assert_eq!(alloc.room(RoomId(0)).unwrap().player_count(), 1);

    assert_eq!(alloc.allocate(&player(2)), Ok(RoomId(0)));
    assert_eq!(alloc.room(RoomId(0)).unwrap().player_count(), 2);
}

#[test]
fn test_saturated_room_declines_without_losing_the_room() {
    let alloc = allocator(1, 4);
    for id in 0..4 {
        alloc.allocate(&player(id)).unwrap();
    }
    assert!(alloc.room(RoomId(0)).unwrap().score <= 0.0);

    assert_eq!(alloc.allocate(&player(10)), Err(RoomError::NoAllocatableRoom));

    let rooms = alloc.snapshot();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].player_count(), 4);
    assert_eq!(rooms[0].slot, Some(0));
}

#[test]
fn test_no_rooms_is_empty_queue() {
    let alloc = allocator(0, 4);
    assert_eq!(alloc.allocate(&player(1)), Err(RoomError::EmptyQueue));
}

#[test]
fn test_reopened_room_becomes_allocatable_again() {
    let alloc = allocator(1, 4);
    alloc.set_state(RoomId(0), LifecycleState::InBattle).unwrap();
    assert_eq!(alloc.allocate(&player(1)), Err(RoomError::NoAllocatableRoom));

    alloc.set_state(RoomId(0), LifecycleState::Waiting).unwrap();
    assert_eq!(alloc.allocate(&player(1)), Ok(RoomId(0)));
}
