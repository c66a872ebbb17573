//! Integration tests for the fixed-rate frame scheduler.
//!
//! Uses `start_paused = true` so Tokio auto-advances the clock and
//! `sleep_until` resolves instantly.

use std::time::Duration;

use roomheap_tick::{TickConfig, TickPolicy, TickScheduler};

fn config_10hz() -> TickConfig {
    TickConfig {
        initial_jitter_us: 0,
        ..TickConfig::with_rate(10)
    }
}

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_event_driven() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_rate_hz, 0);
    assert_eq!(cfg.tick_duration(), None);
    assert_eq!(cfg.policy, TickPolicy::Skip);
}

#[test]
fn test_with_rate_sets_duration() {
    let cfg = TickConfig::with_rate(10);
    assert_eq!(cfg.tick_duration(), Some(Duration::from_millis(100)));
}

#[test]
fn test_validated_clamps_rate() {
    let cfg = TickConfig::with_rate(1_000).validated();
    assert_eq!(cfg.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
}

// =========================================================================
// Scheduler
// =========================================================================

#[test]
fn test_scheduler_initial_state() {
    let s = TickScheduler::new(config_10hz());
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.tick_rate_hz(), 10);
    assert!(!s.is_event_driven());
    assert_eq!(s.tick_duration(), Some(Duration::from_millis(100)));
}

#[test]
fn test_scheduler_event_driven() {
    let s = TickScheduler::with_rate(0);
    assert!(s.is_event_driven());
    assert_eq!(s.tick_duration(), None);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_increment_monotonically() {
    let mut s = TickScheduler::new(config_10hz());
    for expected in 1..=5 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
        assert_eq!(info.dt, Duration::from_millis(100));
        assert!(!info.overrun);
    }
    assert_eq!(s.tick_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_event_driven_never_fires() {
    let mut s = TickScheduler::with_rate(0);
    let result = tokio::time::timeout(Duration::from_secs(5), s.wait_for_tick()).await;
    assert!(result.is_err(), "event-driven scheduler should pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_skip_policy_reports_skipped_frames() {
    let mut s = TickScheduler::new(config_10hz());
    s.wait_for_tick().await;

    // Stall for 3.5 frames past the next deadline.
    tokio::time::advance(Duration::from_millis(450)).await;
    let info = s.wait_for_tick().await;
    assert!(info.overrun);
    assert_eq!(info.ticks_skipped, 3);
}

#[tokio::test(start_paused = true)]
async fn test_drop_policy_keeps_cadence() {
    let mut s = TickScheduler::new(TickConfig {
        policy: TickPolicy::Drop,
        ..config_10hz()
    });
    s.wait_for_tick().await;
    tokio::time::advance(Duration::from_millis(250)).await;

    let late = s.wait_for_tick().await;
    assert!(late.overrun);
    assert_eq!(late.ticks_skipped, 0);

    // The next deadline is still on the original 100 ms grid, already past,
    // so it fires immediately.
    let start = tokio::time::Instant::now();
    s.wait_for_tick().await;
    assert_eq!(tokio::time::Instant::now(), start);
}
