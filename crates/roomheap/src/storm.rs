//! Join storm: many players asking for a room at once.
//!
//! Builds an allocator, starts the keep-alive drain loops, then spawns
//! one task per player. Each task sleeps a random delay and calls
//! [`RoomAllocator::allocate`]. The delay happens before the call, never
//! while the allocator's lock is held.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use roomheap_protocol::{Player, PlayerId, RoomSnapshot};
use roomheap_room::{RoomAllocator, RoomError, RoomSpec, StatePenalties};
use roomheap_tick::{DrainReport, spawn_drain_loops};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::RoomheapError;

/// Settings for [`run_join_storm`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StormConfig {
    /// Rooms created at startup.
    pub room_count: usize,
    /// Capacity of every room.
    pub room_capacity: usize,
    /// Players generated, one allocation each.
    pub player_count: usize,
    /// Upper bound (exclusive) of the random pre-join delay. 0 = no delay.
    pub max_join_delay_ms: u64,
    /// Number of keep-alive drain loops.
    pub drain_loops: usize,
    /// Frames per second for the drain loops.
    pub drain_fps: u32,
    /// Channel size of each drain loop.
    pub drain_capacity: usize,
    pub penalties: StatePenalties,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            room_count: 5,
            room_capacity: 4,
            player_count: 100,
            max_join_delay_ms: 100,
            drain_loops: 2,
            drain_fps: 10,
            drain_capacity: 1024,
            penalties: StatePenalties::default(),
        }
    }
}

impl StormConfig {
    /// Rejects a zero room capacity and an invalid penalty table.
    ///
    /// `room_count == 0` is allowed: the run then fails with
    /// [`RoomError::EmptyQueue`], which is what it is for.
    pub fn validated(self) -> Result<Self, RoomError> {
        if self.room_capacity == 0 {
            return Err(RoomError::InvalidConfig(
                "room_capacity must be positive".into(),
            ));
        }
        let penalties = self.penalties.validated()?;
        Ok(Self { penalties, ..self })
    }
}

/// Outcome of a [`run_join_storm`].
#[derive(Debug, Clone, Serialize)]
pub struct StormReport {
    /// Players placed in a room.
    pub allocated: usize,
    /// Players turned away with [`RoomError::NoAllocatableRoom`].
    pub declined: usize,
    /// Final room states, sorted by room id.
    pub rooms: Vec<RoomSnapshot>,
    pub drain: Vec<DrainReport>,
    /// `false` if the queue failed its invariant check after the run.
    pub consistent: bool,
    pub elapsed_ms: u64,
}

impl StormReport {
    /// Occupants across all rooms.
    pub fn seated(&self) -> usize {
        self.rooms.iter().map(RoomSnapshot::player_count).sum()
    }
}

/// Runs one join storm to completion.
///
/// # Errors
/// - [`RoomError::InvalidConfig`] / [`RoomError::InvalidCapacity`] for bad settings.
/// - [`RoomError::EmptyQueue`] if `room_count` is 0. The drain loops are
///   still shut down before returning.
/// - [`RoomheapError::Join`] if a join task panicked.
pub async fn run_join_storm(config: StormConfig) -> Result<StormReport, RoomheapError> {
    let config = config.validated()?;
    let started = Instant::now();

    let specs = RoomSpec::uniform(config.room_count, config.room_capacity);
    let allocator = Arc::new(RoomAllocator::initialize(&specs, config.penalties.clone())?);

    let names: Vec<String> = (0..config.drain_loops).map(|i| format!("drain-{i}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let drains = spawn_drain_loops::<Player>(&name_refs, config.drain_capacity, config.drain_fps);
    let sinks: Vec<_> = name_refs.iter().filter_map(|n| drains.sender(n)).collect();

    tracing::info!(
        rooms = config.room_count,
        capacity = config.room_capacity,
        players = config.player_count,
        "join storm starting"
    );

    let mut tasks = JoinSet::new();
    for i in 0..config.player_count {
        let player = Player::new(PlayerId(i as u64), format!("Player#{i}"));
        tracing::debug!(
            player_id = %player.id,
            name = %player.name,
            created_at = player.created_at,
            "player generated"
        );

        let delay = if config.max_join_delay_ms > 0 {
            rand::rng().random_range(0..config.max_join_delay_ms)
        } else {
            0
        };
        let allocator = Arc::clone(&allocator);
        tasks.spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            let result = allocator.allocate(&player);
            (player, result)
        });
    }

    let mut allocated = 0;
    let mut declined = 0;
    let mut fatal = None;
    while let Some(joined) = tasks.join_next().await {
        let (player, result) = joined?;
        match result {
            Ok(room_id) => {
                tracing::info!(player_id = %player.id, %room_id, "player joined room");
                if !sinks.is_empty() {
                    // Best effort: a full drain channel just drops the record.
                    let _ = sinks[allocated % sinks.len()].try_send(player);
                }
                allocated += 1;
            }
            Err(e) if e.is_recoverable() => {
                tracing::info!(player_id = %player.id, "no room available");
                declined += 1;
            }
            Err(e) => {
                fatal.get_or_insert(e);
            }
        }
    }

    drop(sinks);
    let drain = drains.shutdown().await?;

    if let Some(e) = fatal {
        tracing::error!(error = %e, "join storm aborted");
        return Err(e.into());
    }

    let consistent = match allocator.check_invariants() {
        Ok(()) => true,
        Err(violation) => {
            tracing::error!(%violation, "room queue invariant violated");
            false
        }
    };

    let mut rooms = allocator.snapshot();
    rooms.sort_by_key(|r| r.id);

    let elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::info!(allocated, declined, elapsed_ms, "join storm finished");

    Ok(StormReport {
        allocated,
        declined,
        rooms,
        drain,
        consistent,
        elapsed_ms,
    })
}
