//! Confidence aggregation
//!
//! Pure function of the four feature scores: identical inputs always yield
//! an identical breakdown.

use crate::types::{RiskLevel, ScoreBreakdown};
use crate::{WEIGHT_ENTROPY, WEIGHT_REACTION, WEIGHT_SMOOTHNESS, WEIGHT_STABILITY};

/// Combine the four feature scores into the final breakdown.
///
/// Confidence is the weighted sum clamped to [0, 100] and rounded to an
/// integer; the risk level is derived from the rounded confidence.
pub fn aggregate(entropy: f64, smoothness: f64, reaction: f64, stability: f64) -> ScoreBreakdown {
    let weighted = WEIGHT_ENTROPY * entropy
        + WEIGHT_SMOOTHNESS * smoothness
        + WEIGHT_REACTION * reaction
        + WEIGHT_STABILITY * stability;
    let confidence = weighted.clamp(0.0, 100.0).round() as u32;

    ScoreBreakdown {
        entropy,
        smoothness,
        reaction,
        stability,
        confidence,
        risk_level: RiskLevel::from_confidence(confidence),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_perfect_is_low_risk() {
        let breakdown = aggregate(100.0, 100.0, 100.0, 100.0);
        assert_eq!(breakdown.confidence, 100);
        assert_eq!(breakdown.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_all_zero_is_high_risk() {
        let breakdown = aggregate(0.0, 0.0, 0.0, 0.0);
        assert_eq!(breakdown.confidence, 0);
        assert_eq!(breakdown.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_weighted_sum() {
        // 0.26*50 + 0.20*50 + 0.24*50 + 0.30*50 = 50
        let breakdown = aggregate(50.0, 50.0, 50.0, 50.0);
        assert_eq!(breakdown.confidence, 50);
        assert_eq!(breakdown.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_idempotent() {
        let a = aggregate(62.0, 41.5, 88.0, 93.2);
        let b = aggregate(62.0, 41.5, 88.0, 93.2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_confidence_in_range_for_extreme_inputs() {
        // Inputs outside [0,100] still clamp at the aggregate
        let breakdown = aggregate(1000.0, 1000.0, 1000.0, 1000.0);
        assert_eq!(breakdown.confidence, 100);
    }
}
