// crates/core/src/status.rs
//! Motion status derived from how old a vehicle's last fix is.

use serde::{Deserialize, Serialize};

/// Fixes older than this many hours mark the vehicle as stopped.
pub const STALE_THRESHOLD_HOURS: f64 = 1.0;

/// Fixes older than this many hours (but not stale) mark the vehicle as idle.
pub const IDLE_THRESHOLD_HOURS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Moving,
    Idle,
    Stopped,
}

impl MotionState {
    pub const ALL: [MotionState; 3] = [MotionState::Moving, MotionState::Idle, MotionState::Stopped];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionState::Moving => "moving",
            MotionState::Idle => "idle",
            MotionState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for MotionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a fix taken at `timestamp` as seen at `now` (both epoch seconds).
///
/// Both comparisons are strict. A timestamp in the future yields a negative
/// age and therefore `Moving`. Ages beyond the i64 range saturate.
pub fn classify(timestamp: i64, now: i64) -> MotionState {
    let age_hours = now.saturating_sub(timestamp) as f64 / 3600.0;
    if age_hours > STALE_THRESHOLD_HOURS {
        MotionState::Stopped
    } else if age_hours > IDLE_THRESHOLD_HOURS {
        MotionState::Idle
    } else {
        MotionState::Moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_fresh_fix_is_moving() {
        assert_eq!(classify(NOW, NOW), MotionState::Moving);
        assert_eq!(classify(NOW - 100, NOW), MotionState::Moving);
    }

    #[test]
    fn test_idle_boundary_is_strict() {
        assert_eq!(classify(NOW - 1800, NOW), MotionState::Moving);
        assert_eq!(classify(NOW - 1801, NOW), MotionState::Idle);
    }

    #[test]
    fn test_stale_boundary_is_strict() {
        assert_eq!(classify(NOW - 3600, NOW), MotionState::Idle);
        assert_eq!(classify(NOW - 3601, NOW), MotionState::Stopped);
    }

    #[test]
    fn test_old_fix_is_stopped() {
        // ~1.39h
        assert_eq!(classify(NOW - 5000, NOW), MotionState::Stopped);
        assert_eq!(classify(0, NOW), MotionState::Stopped);
    }

    #[test]
    fn test_future_timestamp_is_moving() {
        assert_eq!(classify(NOW + 10_000, NOW), MotionState::Moving);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        assert_eq!(classify(i64::MIN, NOW), MotionState::Stopped);
        assert_eq!(classify(i64::MAX, NOW), MotionState::Moving);
        assert_eq!(classify(i64::MIN, i64::MAX), MotionState::Stopped);
        assert_eq!(classify(i64::MAX, i64::MIN), MotionState::Moving);
    }

    #[test]
    fn test_depends_only_on_age() {
        for age in [0, 900, 1800, 1801, 3600, 3601, 86_400] {
            assert_eq!(classify(NOW - age, NOW), classify(1_000 - age, 1_000));
        }
    }

    #[test]
    fn test_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&MotionState::Moving).unwrap(), "\"moving\"");
        assert_eq!(serde_json::to_string(&MotionState::Stopped).unwrap(), "\"stopped\"");
        assert_eq!(MotionState::Idle.to_string(), "idle");
    }
}
