//! Stateless traffic risk classifier
//!
//! A coarse heuristic scorer over traffic/entropy/latency signals, consumed
//! by the surrounding app over HTTP. Separate from the motion engine's own
//! confidence pipeline, and deliberately simple: additive points per signal,
//! bucketed into a risk level and a step-up action.

use crate::types::{RiskAssessment, RiskLevel, RiskRequest, StepUp};

/// Signal thresholds (inclusive)
const TRAFFIC_LOAD_HIGH: f64 = 0.75;
const ENTROPY_LOW: f64 = 0.30;
const LATENCY_VARIANCE_LOW: f64 = 0.20;

/// A rejected request: descriptive reason, no state mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskValidationError {
    pub reason: String,
}

impl RiskValidationError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for RiskValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

fn require_unit(value: Option<f64>, field: &str) -> Result<f64, RiskValidationError> {
    let v = value.ok_or_else(|| RiskValidationError::new(format!("missing field: {}", field)))?;
    if !(0.0..=1.0).contains(&v) {
        return Err(RiskValidationError::new(format!(
            "{} out of range [0,1]: {}",
            field, v
        )));
    }
    Ok(v)
}

/// Score a risk request.
///
/// +2 traffic_load >= 0.75, +2 motion_entropy_score <= 0.30,
/// +1 interaction_latency_variance <= 0.20, +1 tilt_fail_count >= 1.
/// Total <= 1 low/none, <= 3 medium/tilt, else high/beat. All boundary
/// values are inclusive.
pub fn evaluate_risk(request: &RiskRequest) -> Result<RiskAssessment, RiskValidationError> {
    let traffic_load = require_unit(request.traffic_load, "traffic_load")?;
    let motion_entropy = require_unit(request.motion_entropy_score, "motion_entropy_score")?;
    let latency_variance = require_unit(
        request.interaction_latency_variance,
        "interaction_latency_variance",
    )?;
    let tilt_fails = request.tilt_fail_count.unwrap_or(0);
    if tilt_fails < 0 {
        return Err(RiskValidationError::new(format!(
            "tilt_fail_count must be >= 0: {}",
            tilt_fails
        )));
    }

    let mut score = 0u32;
    let mut signals: Vec<&str> = Vec::new();

    if traffic_load >= TRAFFIC_LOAD_HIGH {
        score += 2;
        signals.push("elevated traffic load");
    }
    if motion_entropy <= ENTROPY_LOW {
        score += 2;
        signals.push("low motion entropy");
    }
    if latency_variance <= LATENCY_VARIANCE_LOW {
        score += 1;
        signals.push("uniform interaction latency");
    }
    if tilt_fails >= 1 {
        score += 1;
        signals.push("prior tilt failures");
    }

    let (risk_level, step_up) = if score <= 1 {
        (RiskLevel::Low, StepUp::None)
    } else if score <= 3 {
        (RiskLevel::Medium, StepUp::Tilt)
    } else {
        (RiskLevel::High, StepUp::Beat)
    };

    let reason = if signals.is_empty() {
        "no elevated signals".to_string()
    } else {
        signals.join("; ")
    };

    Ok(RiskAssessment {
        risk_level,
        reason,
        step_up,
    })
}

// =============================================================================
// TESTS
// =============================================================================
