//! # roomheap
//!
//! Concurrent allocation of players to a fixed pool of rooms.
//!
//! The heavy lifting lives in `roomheap-room`: a score-ordered heap of
//! rooms behind one lock. This crate stitches it together with the
//! protocol types and the keep-alive loops from `roomheap-tick`, and adds
//! a harness that fires a burst of concurrent joins at an allocator.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomheap::prelude::*;
//!
//! # async fn demo() -> Result<(), RoomheapError> {
//! let report = run_join_storm(StormConfig::default()).await?;
//! println!("{} placed, {} declined", report.allocated, report.declined);
//! # Ok(())
//! # }
//! ```

mod error;
mod storm;
mod telemetry;

pub use error::RoomheapError;
pub use storm::{StormConfig, StormReport, run_join_storm};
pub use telemetry::init_tracing;

pub mod prelude {
    pub use crate::{RoomheapError, StormConfig, StormReport, init_tracing, run_join_storm};
    pub use roomheap_protocol::{Codec, JsonCodec, Player, PlayerId, RoomId, RoomSnapshot};
    pub use roomheap_room::{
        CheckoutObserver, LifecycleState, RoomAllocator, RoomError, RoomSpec, StatePenalties,
    };
    pub use roomheap_tick::DrainReport;
}
