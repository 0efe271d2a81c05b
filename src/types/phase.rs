//! Challenge phase definitions

use serde::{Deserialize, Serialize};

use crate::types::ChallengeTask;

/// The phases of a challenge run. Linear: tilt-left → tilt-right →
/// hold-steady → complete, with no backward transitions except full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengePhase {
    /// First task: tilt past the threshold to the left
    TiltLeft,
    /// Second task: tilt past the threshold to the right
    TiltRight,
    /// Third task: keep the device inside the deadband
    HoldSteady,
    /// Terminal phase; the score breakdown is available
    Complete,
}

impl ChallengePhase {
    /// The task driven in this phase, if any
    pub fn task(&self) -> Option<ChallengeTask> {
        match self {
            ChallengePhase::TiltLeft => Some(ChallengeTask::TiltLeft),
            ChallengePhase::TiltRight => Some(ChallengeTask::TiltRight),
            ChallengePhase::HoldSteady => Some(ChallengeTask::HoldSteady),
            ChallengePhase::Complete => None,
        }
    }

    /// The phase that follows a completed task
    pub fn next(&self) -> ChallengePhase {
        match self {
            ChallengePhase::TiltLeft => ChallengePhase::TiltRight,
            ChallengePhase::TiltRight => ChallengePhase::HoldSteady,
            ChallengePhase::HoldSteady => ChallengePhase::Complete,
            ChallengePhase::Complete => ChallengePhase::Complete,
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            ChallengePhase::TiltLeft => "\x1b[36m",   // Cyan
            ChallengePhase::TiltRight => "\x1b[35m",  // Magenta
            ChallengePhase::HoldSteady => "\x1b[33m", // Yellow
            ChallengePhase::Complete => "\x1b[32m",   // Green
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            ChallengePhase::TiltLeft => "⬅",
            ChallengePhase::TiltRight => "➡",
            ChallengePhase::HoldSteady => "🎯",
            ChallengePhase::Complete => "✅",
        }
    }
}

impl std::fmt::Display for ChallengePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChallengePhase::TiltLeft => "TILT_LEFT",
            ChallengePhase::TiltRight => "TILT_RIGHT",
            ChallengePhase::HoldSteady => "HOLD_STEADY",
            ChallengePhase::Complete => "COMPLETE",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// TESTS
// =============================================================================
