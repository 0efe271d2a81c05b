//! Orientation readings and task baselines

use serde::{Deserialize, Serialize};

/// One raw event from the platform orientation stream.
///
/// Angle fields are nullable at the platform boundary: some devices deliver
/// events before the sensor warms up. Null fields are skipped, never
/// propagated as zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrientationEvent {
    /// Front-back tilt (beta), degrees
    pub pitch_deg: Option<f64>,
    /// Left-right tilt (gamma), degrees
    pub roll_deg: Option<f64>,
    /// Event timestamp, milliseconds
    pub timestamp_ms: f64,
}

impl OrientationEvent {
    /// Validate into a sample; None if either angle is missing
    pub fn to_sample(&self) -> Option<OrientationSample> {
        match (self.pitch_deg, self.roll_deg) {
            (Some(pitch_deg), Some(roll_deg)) => Some(OrientationSample {
                pitch_deg,
                roll_deg,
                timestamp_ms: self.timestamp_ms,
            }),
            _ => None,
        }
    }
}

/// A validated orientation reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub timestamp_ms: f64,
}

impl OrientationSample {
    pub fn new(pitch_deg: f64, roll_deg: f64, timestamp_ms: f64) -> Self {
        Self {
            pitch_deg,
            roll_deg,
            timestamp_ms,
        }
    }
}

/// Orientation snapshot captured at the start of each task.
///
/// All task progress is measured against the current task's baseline, not a
/// global origin; the baseline is recaptured on every task transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub pitch_deg: f64,
    pub roll_deg: f64,
}

impl Baseline {
    /// Capture a baseline from the current smoothed angles
    pub fn capture(pitch_deg: f64, roll_deg: f64) -> Self {
        Self { pitch_deg, roll_deg }
    }

    /// Baseline-relative pitch delta
    pub fn pitch_delta(&self, pitch_deg: f64) -> f64 {
        pitch_deg - self.pitch_deg
    }

    /// Baseline-relative roll delta
    pub fn roll_delta(&self, roll_deg: f64) -> f64 {
        roll_deg - self.roll_deg
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_with_both_angles_validates() {
        let event = OrientationEvent {
            pitch_deg: Some(10.0),
            roll_deg: Some(-4.0),
            timestamp_ms: 100.0,
        };
        let sample = event.to_sample().unwrap();
        assert_eq!(sample.pitch_deg, 10.0);
        assert_eq!(sample.roll_deg, -4.0);
        assert_eq!(sample.timestamp_ms, 100.0);
    }

    #[test]
    fn test_event_with_null_angle_is_skipped() {
        let event = OrientationEvent {
            pitch_deg: None,
            roll_deg: Some(-4.0),
            timestamp_ms: 100.0,
        };
        assert!(event.to_sample().is_none());

        let event = OrientationEvent {
            pitch_deg: Some(1.0),
            roll_deg: None,
            timestamp_ms: 100.0,
        };
        assert!(event.to_sample().is_none());
    }

    #[test]
    fn test_baseline_deltas() {
        let baseline = Baseline::capture(5.0, -2.0);
        assert_eq!(baseline.pitch_delta(8.0), 3.0);
        assert_eq!(baseline.roll_delta(-20.0), -18.0);
    }
}
