//! Per-tick output records, reason codes, and challenge events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChallengePhase, ChallengeTask, ScoreBreakdown};

/// Reason codes for tick-level progress and transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum TickReason {
    /// No validated reading has arrived yet
    C001_AWAITING_SAMPLE,
    /// Tilt task: roll delta has not crossed the threshold
    C002_TILT_SEEKING,
    /// Tilt task: past the threshold, hold accumulating
    C003_TILT_ACCUMULATING,
    /// Tilt task: condition broke, accumulator reset to zero
    C003_TILT_RESET,
    /// Hold task: inside the deadband, accumulating at full rate
    C004_HOLD_ACCUMULATING,
    /// Hold task: outside the deadband, accumulator decaying
    C004_HOLD_DECAYING,
    /// Tilt-left satisfied, advancing to tilt-right
    C005_ADVANCE_TO_TILT_RIGHT,
    /// Tilt-right satisfied, advancing to hold-steady
    C005_ADVANCE_TO_HOLD_STEADY,
    /// Hold target reached, challenge complete
    C005_CHALLENGE_COMPLETE,
}

impl TickReason {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::C001_AWAITING_SAMPLE => "C001_AWAITING_SAMPLE",
            Self::C002_TILT_SEEKING => "C002_TILT_SEEKING",
            Self::C003_TILT_ACCUMULATING => "C003_TILT_ACCUMULATING",
            Self::C003_TILT_RESET => "C003_TILT_RESET",
            Self::C004_HOLD_ACCUMULATING => "C004_HOLD_ACCUMULATING",
            Self::C004_HOLD_DECAYING => "C004_HOLD_DECAYING",
            Self::C005_ADVANCE_TO_TILT_RIGHT => "C005_ADVANCE_TO_TILT_RIGHT",
            Self::C005_ADVANCE_TO_HOLD_STEADY => "C005_ADVANCE_TO_HOLD_STEADY",
            Self::C005_CHALLENGE_COMPLETE => "C005_CHALLENGE_COMPLETE",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::C001_AWAITING_SAMPLE => "Waiting for first reading",
            Self::C002_TILT_SEEKING => "Tilt below threshold",
            Self::C003_TILT_ACCUMULATING => "Tilt held, accumulating",
            Self::C003_TILT_RESET => "Tilt broke, accumulator reset",
            Self::C004_HOLD_ACCUMULATING => "Inside deadband",
            Self::C004_HOLD_DECAYING => "Outside deadband, decaying",
            Self::C005_ADVANCE_TO_TILT_RIGHT => "Advancing to tilt-right",
            Self::C005_ADVANCE_TO_HOLD_STEADY => "Advancing to hold-steady",
            Self::C005_CHALLENGE_COMPLETE => "Challenge complete",
        }
    }
}

impl std::fmt::Display for TickReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Typed notifications emitted by the engine, replacing the original
/// implicit global event bus. `ChallengeCompleted` fires exactly once per
/// run; drivers fire the best-effort haptic pulse on `TaskCompleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChallengeEvent {
    TaskCompleted {
        task: ChallengeTask,
        elapsed_ms: f64,
    },
    ChallengeCompleted {
        breakdown: ScoreBreakdown,
    },
}

/// Output structure for each processed tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickOutput {
    /// Wall-clock timestamp of emission
    pub timestamp: DateTime<Utc>,
    /// Phase after this tick
    pub phase: ChallengePhase,
    /// Baseline-relative pitch delta (degrees)
    pub pitch_delta_deg: f64,
    /// Baseline-relative roll delta (degrees)
    pub roll_delta_deg: f64,
    /// Active task's hold accumulator (milliseconds): the tilt hold during
    /// the tilt phases, the steady hold during hold-steady
    pub hold_ms: f64,
    /// Accumulator progress toward the active task's target (0-100)
    pub hold_progress_pct: f64,
    /// Instantaneous stability during the hold task (0-100)
    pub stability_pct: Option<f64>,
    /// Reason for this tick's outcome
    pub reason: TickReason,
    /// Events raised by this tick
    pub events: Vec<ChallengeEvent>,
}

impl TickOutput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        phase: ChallengePhase,
        pitch_delta_deg: f64,
        roll_delta_deg: f64,
        hold_ms: f64,
        hold_progress_pct: f64,
        stability_pct: Option<f64>,
        reason: TickReason,
        events: Vec<ChallengeEvent>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            phase,
            pitch_delta_deg,
            roll_delta_deg,
            hold_ms,
            hold_progress_pct,
            stability_pct,
            reason,
            events,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = ChallengePhase::color_reset();
        let emoji = self.phase.emoji();

        let stability = match self.stability_pct {
            Some(s) => format!(" | steady={:.0}%", s),
            None => String::new(),
        };

        format!(
            "{}{} phase={} | Δroll={:+.1}° | hold={:.0}ms ({:.0}%){} | {}{}",
            color,
            emoji,
            self.phase,
            self.roll_delta_deg,
            self.hold_ms,
            self.hold_progress_pct,
            stability,
            self.reason.code(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let stability = match self.stability_pct {
            Some(s) => format!(" | steady={:.0}", s),
            None => String::new(),
        };
        format!(
            "phase={} | droll={:+.1} | dpitch={:+.1} | hold={:.0} | progress={:.0}{} | reason={}",
            self.phase,
            self.roll_delta_deg,
            self.pitch_delta_deg,
            self.hold_ms,
            self.hold_progress_pct,
            stability,
            self.reason.code()
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parseable_format_contains_fields() {
        let output = TickOutput::new(
            ChallengePhase::TiltLeft,
            1.0,
            -17.5,
            120.0,
            0.0,
            None,
            TickReason::C003_TILT_ACCUMULATING,
            vec![],
        );
        let formatted = output.to_parseable_string();
        assert!(formatted.contains("phase=TILT_LEFT"));
        assert!(formatted.contains("droll=-17.5"));
        assert!(formatted.contains("reason=C003_TILT_ACCUMULATING"));
    }

    #[test]
    fn test_json_round_trip() {
        let output = TickOutput::new(
            ChallengePhase::HoldSteady,
            0.5,
            -0.5,
            600.0,
            50.0,
            Some(92.0),
            TickReason::C004_HOLD_ACCUMULATING,
            vec![],
        );
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"phase\""));
        assert!(json.contains("\"reason\""));
        let _: TickOutput = serde_json::from_str(&json).unwrap();
    }
}
