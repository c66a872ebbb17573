//! Fixed-rate frame scheduling for roomheap's background loops.
//!
//! Two pieces:
//!
//! - [`TickScheduler`] fires at a fixed rate (1–128 Hz), or never in
//!   event-driven mode (`tick_rate_hz == 0`).
//! - [`DrainLoop`] / [`spawn_drain_loops`] run keep-alive loops that pull
//!   at most one queued item per frame and stop on a cooperative shutdown
//!   signal.
//!
//! None of this touches the room queue. The loops run beside the
//! allocator, not inside it.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = shutdown.changed() => break,
//!         info = scheduler.wait_for_tick() => { /* one frame of work */ }
//!     }
//! }
//! ```

mod drain;

pub use drain::{DrainLoop, DrainPool, DrainReport, spawn_drain_loops};

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a frame fires late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Forget the missed frames and schedule the next one from now.
    #[default]
    Skip,
    /// Keep the original cadence; the next frame fires at its planned time.
    Drop,
}

/// Configuration for [`TickScheduler`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Frames per second. 0 = event-driven (never fires).
    pub tick_rate_hz: u32,
    /// Late-frame handling.
    pub policy: TickPolicy,
    /// Random jitter (0–max µs) added to the first frame so loops started
    /// together don't wake together.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            policy: TickPolicy::default(),
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Config for a specific rate with default policy and jitter.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Caps `tick_rate_hz` at [`Self::MAX_TICK_RATE_HZ`].
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Length of one frame. `None` in event-driven mode.
    pub fn tick_duration(&self) -> Option<Duration> {
        if self.tick_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64))
        }
    }
}

// ---------------------------------------------------------------------------
// TickInfo
// ---------------------------------------------------------------------------

/// Returned by [`TickScheduler::wait_for_tick`] for each frame.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Frame number, starting at 1.
    pub tick: u64,
    /// Fixed frame length (`1 / tick_rate`).
    pub dt: Duration,
    /// `true` if the frame fired more than 10% late.
    pub overrun: bool,
    /// Whole frames skipped because of lateness (Skip policy only).
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-rate frame scheduler. One per loop.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Option<Duration>,
    tick_count: u64,
    next_tick: Option<TokioInstant>,
}

impl TickScheduler {
    /// Creates a scheduler; the first frame is due one period (plus
    /// jitter) from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let next_tick = tick_duration.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
            } else {
                Duration::ZERO
            };
            TokioInstant::now() + d + jitter
        });

        match tick_duration {
            None => debug!("tick scheduler created in event-driven mode"),
            Some(d) => debug!(
                rate_hz = config.tick_rate_hz,
                frame_ms = d.as_secs_f64() * 1000.0,
                policy = ?config.policy,
                "tick scheduler created"
            ),
        }

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick,
        }
    }

    /// Scheduler for a specific rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits for the next frame.
    ///
    /// Pends forever in event-driven mode, so it is only useful as one
    /// branch of a `tokio::select!`.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, dur) = match (self.next_tick, self.tick_duration) {
            (Some(next), Some(dur)) => (next, dur),
            _ => std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > dur / 10;
        let mut ticks_skipped = 0;

        self.next_tick = Some(match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / dur.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            "frame overrun, skipping ahead"
                        );
                    }
                }
                now + dur
            }
            TickPolicy::Drop => next + dur,
        });

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: dur,
            overrun,
            ticks_skipped,
        }
    }

    pub fn is_event_driven(&self) -> bool {
        self.tick_duration.is_none()
    }

    /// Frames fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_duration
    }
}
