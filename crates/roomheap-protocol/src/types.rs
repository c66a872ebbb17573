//! Core value types for roomheap.
//!
//! Everything here is plain data: ids, the player record a caller hands
//! to the allocator, and the snapshot the allocator hands back.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::unix_time_millis;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over `u64` so a `RoomId` can never be passed where a
/// `PlayerId` is expected. `#[serde(transparent)]` keeps the JSON form a
/// plain number: `PlayerId(42)` becomes `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room.
///
/// Assigned once when the room is created and never reused while the
/// process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player asking to be placed in a room.
///
/// Immutable once built. The allocator reads `id` (it is the occupant
/// map key) and ignores the rest; `name` and `created_at` exist for
/// whoever logs or exports the result.
///
/// `#[serde(rename_all = "camelCase")]` gives the external field names
/// `id`, `name`, `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Creation time in Unix milliseconds.
    pub created_at: i64,
}

impl Player {
    /// Creates a player stamped with the current wall-clock time.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self::at(id, name, unix_time_millis())
    }

    /// Creates a player with an explicit creation timestamp.
    pub fn at(id: PlayerId, name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomSnapshot
// ---------------------------------------------------------------------------

/// A read-only picture of one room at one instant.
///
/// Produced by the room layer for diagnostics and export. `slot` is the
/// room's position in the allocation queue's storage, or `None` while the
/// room is checked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub capacity: usize,
    /// Occupant ids, sorted ascending.
    pub players: Vec<PlayerId>,
    pub score: f64,
    /// Lifecycle state name, e.g. `"IDLE"`.
    pub state: String,
    pub slot: Option<usize>,
}

impl RoomSnapshot {
    /// Number of occupants.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
