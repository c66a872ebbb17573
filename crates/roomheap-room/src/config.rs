//! Room lifecycle states and the penalty table that scores them.

use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// LifecycleState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// The allocator does not drive transitions between these states; it
/// only reads the penalty each one carries (see [`StatePenalties`]).
///
/// - **Idle**: freshly created, nobody has asked for it yet.
/// - **Waiting**: gathering players.
/// - **InBattle**: a match is running. Not joinable.
/// - **InSettlement**: results are being tallied. Not joinable.
/// - **InDismissal**: the room is being torn down. Not joinable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Idle,
    Waiting,
    InBattle,
    InSettlement,
    InDismissal,
}

impl LifecycleState {
    /// All states, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::Waiting,
        Self::InBattle,
        Self::InSettlement,
        Self::InDismissal,
    ];

    /// Returns `true` for states whose default penalty is zero.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Idle | Self::Waiting)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Waiting => write!(f, "WAITING"),
            Self::InBattle => write!(f, "IN_BATTLE"),
            Self::InSettlement => write!(f, "IN_SETTLEMENT"),
            Self::InDismissal => write!(f, "IN_DISMISSAL"),
        }
    }
}

// ---------------------------------------------------------------------------
// StatePenalties
// ---------------------------------------------------------------------------

/// How much each lifecycle state subtracts from a room's score.
///
/// Built once at startup and handed by reference to every score
/// computation. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatePenalties {
    pub idle: f64,
    pub waiting: f64,
    pub in_battle: f64,
    pub in_settlement: f64,
    pub in_dismissal: f64,
}

impl StatePenalties {
    /// Penalty large enough that no occupancy can lift the score above zero.
    pub const BLOCKING: f64 = 9_999_999.0;

    /// Returns the penalty carried by `state`.
    pub fn penalty(&self, state: LifecycleState) -> f64 {
        match state {
            LifecycleState::Idle => self.idle,
            LifecycleState::Waiting => self.waiting,
            LifecycleState::InBattle => self.in_battle,
            LifecycleState::InSettlement => self.in_settlement,
            LifecycleState::InDismissal => self.in_dismissal,
        }
    }

    /// Rejects tables containing NaN or negative penalties.
    ///
    /// A negative penalty would let a full room score above zero, and NaN
    /// breaks the queue's ordering.
    pub fn validated(self) -> Result<Self, RoomError> {
        for state in LifecycleState::ALL {
            let p = self.penalty(state);
            if p.is_nan() || p < 0.0 {
                return Err(RoomError::InvalidConfig(format!(
                    "penalty for {state} must be a non-negative number, got {p}"
                )));
            }
        }
        Ok(self)
    }
}

impl Default for StatePenalties {
    fn default() -> Self {
        Self {
            idle: 0.0,
            waiting: 0.0,
            in_battle: Self::BLOCKING,
            in_settlement: Self::BLOCKING,
            in_dismissal: Self::BLOCKING,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomSpec
// ---------------------------------------------------------------------------

/// Startup description of one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSpec {
    /// Maximum occupants. Must be positive.
    pub capacity: usize,
}

impl RoomSpec {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// `count` rooms that all share `capacity`.
    pub fn uniform(count: usize, capacity: usize) -> Vec<Self> {
        vec![Self::new(capacity); count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_penalties_block_non_joinable_states() {
        let p = StatePenalties::default();
        for state in LifecycleState::ALL {
            if state.is_joinable() {
                assert_eq!(p.penalty(state), 0.0, "{state}");
            } else {
                assert_eq!(p.penalty(state), StatePenalties::BLOCKING, "{state}");
            }
        }
    }

    #[test]
    fn test_validated_rejects_negative_penalty() {
        let p = StatePenalties {
            waiting: -1.0,
            ..StatePenalties::default()
        };
        assert!(matches!(p.validated(), Err(RoomError::InvalidConfig(_))));
    }

    #[test]
    fn test_validated_rejects_nan_penalty() {
        let p = StatePenalties {
            in_battle: f64::NAN,
            ..StatePenalties::default()
        };
        assert!(p.validated().is_err());
    }

    #[test]
    fn test_validated_accepts_default() {
        assert!(StatePenalties::default().validated().is_ok());
    }

    #[test]
    fn test_lifecycle_state_display() {
        assert_eq!(LifecycleState::Idle.to_string(), "IDLE");
        assert_eq!(LifecycleState::InSettlement.to_string(), "IN_SETTLEMENT");
    }

    #[test]
    fn test_lifecycle_state_serde_matches_display() {
        for state in LifecycleState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }

    #[test]
    fn test_penalties_partial_json_uses_defaults() {
        let p: StatePenalties = serde_json::from_str(r#"{"waiting": 1.5}"#).unwrap();
        assert_eq!(p.waiting, 1.5);
        assert_eq!(p.idle, 0.0);
        assert_eq!(p.in_dismissal, StatePenalties::BLOCKING);
    }

    #[test]
    fn test_room_spec_uniform() {
        let specs = RoomSpec::uniform(3, 4);
        assert_eq!(specs.len(), 3);
        assert!(specs.iter().all(|s| s.capacity == 4));
    }
}
