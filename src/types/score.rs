//! Confidence score breakdown and risk bucketing

use serde::{Deserialize, Serialize};

use crate::{CONFIDENCE_LOW_RISK, CONFIDENCE_MEDIUM_RISK};

/// Risk bucket derived from the aggregate confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a confidence value. Boundaries are inclusive on the low side:
    /// >= 80 low, >= 55 medium, else high.
    pub fn from_confidence(confidence: u32) -> Self {
        if confidence >= CONFIDENCE_LOW_RISK {
            RiskLevel::Low
        } else if confidence >= CONFIDENCE_MEDIUM_RISK {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        write!(f, "{}", name)
    }
}

/// Final, immutable output of one completed challenge run.
///
/// Carried as diagnostic output: task completion alone decides pass/fail,
/// the score does not gate the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Plausible, non-robotic dynamics (0-100)
    pub entropy: f64,
    /// Natural micro-curvature of the motion path (0-100)
    pub smoothness: f64,
    /// Human-typical response latency (0-100)
    pub reaction: f64,
    /// Steadiness during the hold task (0-100)
    pub stability: f64,
    /// Weighted aggregate, clamped to [0, 100] and rounded
    pub confidence: u32,
    /// Bucketed confidence
    pub risk_level: RiskLevel,
}

// =============================================================================
// TESTS
// =============================================================================
