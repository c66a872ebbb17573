//! Value types shared by every roomheap layer.
//!
//! This crate defines the data that flows INTO the allocator and the
//! views that flow OUT of it:
//!
//! - **Identity** ([`PlayerId`], [`RoomId`]) — newtype wrappers so the two
//!   kinds of id can never be mixed up.
//! - **Players** ([`Player`]) — the immutable value a caller hands to the
//!   allocator. The allocator only ever reads its id.
//! - **Snapshots** ([`RoomSnapshot`]) — a read-only picture of a room for
//!   diagnostics and JSON export.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those values are
//!   turned into bytes for anything outside the process.
//!
//! # Architecture
//!
//! ```text
//! Caller (Player) → Room layer (allocation) → Snapshot → Codec (bytes)
//! ```
//!
//! Nothing in here knows about locking or heaps.

mod clock;
mod codec;
mod error;
mod types;

pub use clock::unix_time_millis;
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Player, PlayerId, RoomId, RoomSnapshot};
