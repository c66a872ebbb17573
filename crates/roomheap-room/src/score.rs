//! The desirability score that orders rooms in the queue.
//!
//! ```text
//! x     = count / capacity
//! score = PEAK_SCORE - CURVATURE * (x - PEAK_RATIO)^2 - penalty
//! ```
//!
//! The curve tops out at an occupancy ratio of 0.2 and falls off on both
//! sides, so new players are steered toward rooms that already have
//! someone in them but are far from full. At ratio 1.0 the curve reaches
//! exactly zero, which the queue treats as "not allocatable".

/// Occupancy ratio at which the score peaks.
pub const PEAK_RATIO: f64 = 0.2;

/// Steepness of the parabola. Chosen so a full room scores `0.0`.
pub const CURVATURE: f64 = 7.8125;

/// Score of an unpenalized room sitting exactly at [`PEAK_RATIO`].
pub const PEAK_SCORE: f64 = 5.0;

/// Computes a room's score from its occupant count, capacity and the
/// penalty of its lifecycle state.
///
/// Pure. The ratio is not clamped: an over-capacity `count` yields a
/// ratio above 1.0 and a correspondingly negative score.
pub fn score(count: usize, capacity: usize, penalty: f64) -> f64 {
    let x = count as f64 / capacity as f64;
    let d = x - PEAK_RATIO;
    -CURVATURE * d * d + PEAK_SCORE - penalty
}
