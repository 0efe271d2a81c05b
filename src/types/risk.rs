//! Wire types for the external traffic risk classifier
//!
//! A stateless heuristic scorer consumed by the surrounding app over HTTP,
//! separate from the motion engine's own confidence pipeline.

use serde::{Deserialize, Serialize};

use crate::types::RiskLevel;

/// Request body for POST /risk/evaluate.
///
/// Required fields are modeled as Option so a missing field produces a
/// descriptive 400, not a framework-level deserialization failure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskRequest {
    /// Required, [0, 1]
    pub traffic_load: Option<f64>,
    /// Required, [0, 1]
    pub motion_entropy_score: Option<f64>,
    /// Required, [0, 1]
    pub interaction_latency_variance: Option<f64>,
    /// Optional, >= 0. Signed so a negative value reaches the validator and
    /// gets a descriptive rejection instead of a deserialization failure.
    pub tilt_fail_count: Option<i64>,
    /// Optional free-form device hint
    pub device_type: Option<String>,
}

/// Escalation action requested when risk is elevated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepUp {
    /// No escalation
    None,
    /// Require the tilt challenge
    Tilt,
    /// Require the beat challenge
    Beat,
}

impl std::fmt::Display for StepUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepUp::None => "none",
            StepUp::Tilt => "tilt",
            StepUp::Beat => "beat",
        };
        write!(f, "{}", name)
    }
}

/// Response body for POST /risk/evaluate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub reason: String,
    pub step_up: StepUp,
}
