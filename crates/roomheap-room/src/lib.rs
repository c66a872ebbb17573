//! Score-ordered room allocation for roomheap.
//!
//! A fixed pool of rooms lives in a binary max-heap keyed by a
//! desirability score. Each allocation pops the best room, admits one
//! player, and pushes the room back, all under a single lock so
//! concurrent callers never see a room twice or a half-fixed heap.
//!
//! # Key types
//!
//! - [`RoomAllocator`] — the thread-safe entry point (`initialize`, `allocate`)
//! - [`RoomQueue`] — the indexed heap underneath it
//! - [`Room`] — occupants, lifecycle state, cached score
//! - [`StatePenalties`] — how much each [`LifecycleState`] costs
//! - [`score()`] — the scoring curve

mod allocator;
mod config;
mod error;
mod queue;
mod room;
pub mod score;

pub use allocator::{CheckoutObserver, RoomAllocator};
pub use config::{LifecycleState, RoomSpec, StatePenalties};
pub use error::RoomError;
pub use queue::{InvariantViolation, RoomQueue};
pub use room::Room;
pub use score::score;
