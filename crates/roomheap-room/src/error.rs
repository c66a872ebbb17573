//! Error types for the room layer.

use roomheap_protocol::RoomId;

/// Errors that can occur during room allocation and queue maintenance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoomError {
    /// The queue holds no rooms at all. A misconfiguration: the
    /// allocator was initialized with an empty room list.
    #[error("room queue is empty")]
    EmptyQueue,

    /// Rooms exist, but the best one scores zero or below (every room is
    /// saturated or in a non-joinable state). Recoverable per request.
    #[error("no room is currently allocatable")]
    NoAllocatableRoom,

    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A room spec asked for zero capacity.
    #[error("room spec at index {index} has zero capacity")]
    InvalidCapacity { index: usize },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RoomError {
    /// Returns `true` if the caller may simply try again later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoAllocatableRoom)
    }
}
