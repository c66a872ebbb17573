//! Unified error type for roomheap.

use roomheap_protocol::ProtocolError;
use roomheap_room::RoomError;
use tokio::task::JoinError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attributes let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum RoomheapError {
    /// An allocation or room configuration error.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// An encode/decode error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A spawned task panicked or was cancelled.
    #[error("task failed: {0}")]
    Join(#[from] JoinError),
}
