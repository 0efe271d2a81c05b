//! Kinematic feature extractors
//!
//! Four independent scores computed once the challenge completes: entropy,
//! smoothness, reaction, stability. All are pure functions over the sample
//! snapshot and recorded task timings, and all land in [0, 100].
//!
//! Per-pair dt is clamped to [8, 60] ms so a stalled sensor cannot blow up
//! the divisions. Fewer than 8 samples returns fixed low floors.

use crate::types::{OrientationSample, TaskTimings, TASK_COUNT};
use crate::{
    DT_MAX_MS, DT_MIN_MS, ENTROPY_FLOOR, MIN_FEATURE_SAMPLES, REACTION_FLOOR, REACTION_MIN_MS,
    REACTION_PEAK_MS, REACTION_SIGMA_MS, SMOOTHNESS_FLOOR,
};

/// One consecutive-pair step through the sample buffer
struct Step {
    dpitch: f64,
    droll: f64,
    /// Clamped to [DT_MIN_MS, DT_MAX_MS]
    dt: f64,
}

fn steps(samples: &[OrientationSample]) -> Vec<Step> {
    samples
        .windows(2)
        .map(|pair| Step {
            dpitch: pair[1].pitch_deg - pair[0].pitch_deg,
            droll: pair[1].roll_deg - pair[0].roll_deg,
            dt: (pair[1].timestamp_ms - pair[0].timestamp_ms).clamp(DT_MIN_MS, DT_MAX_MS),
        })
        .collect()
}

/// Per-step speed: angular delta magnitude over dt (deg/ms)
fn velocities(steps: &[Step]) -> Vec<f64> {
    steps
        .iter()
        .map(|s| (s.dpitch * s.dpitch + s.droll * s.droll).sqrt() / s.dt)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Entropy: rewards plausible, non-robotic dynamics.
///
/// Velocity variance and mean jerk drive the score; too little movement and
/// excessive jitter are both penalized.
pub fn entropy_score(samples: &[OrientationSample]) -> f64 {
    if samples.len() < MIN_FEATURE_SAMPLES {
        return ENTROPY_FLOOR;
    }

    let steps = steps(samples);
    let v = velocities(&steps);

    let mut accel = Vec::with_capacity(v.len().saturating_sub(1));
    for i in 1..v.len() {
        accel.push((v[i] - v[i - 1]).abs() / steps[i].dt);
    }
    let mut jerk = Vec::with_capacity(accel.len().saturating_sub(1));
    for i in 1..accel.len() {
        jerk.push((accel[i] - accel[i - 1]).abs() / steps[i + 1].dt);
    }

    let dynamics = ((1.0 + variance(&v)).ln() / 4.2 * 100.0).clamp(0.0, 100.0);
    let jerkiness = ((1.0 + mean(&jerk)).ln() / 6.0 * 100.0).clamp(0.0, 100.0);

    let low_penalty = (22.0 - dynamics * 0.35).clamp(0.0, 22.0);
    let high_penalty = ((jerkiness - 78.0) * 0.8).clamp(0.0, 22.0);

    (0.55 * dynamics + 0.45 * jerkiness - low_penalty - high_penalty).clamp(0.0, 100.0)
}

/// Smoothness: rewards natural micro-curvature, penalizes perfectly linear
/// and perfectly erratic motion alike.
pub fn smoothness_score(samples: &[OrientationSample]) -> f64 {
    if samples.len() < MIN_FEATURE_SAMPLES {
        return SMOOTHNESS_FLOOR;
    }

    let steps = steps(samples);
    let directions: Vec<f64> = steps.iter().map(|s| s.dpitch.atan2(s.droll)).collect();

    let mut turns = Vec::with_capacity(directions.len().saturating_sub(1));
    for i in 1..directions.len() {
        // Unwrap the angular difference into [-pi, pi]
        let mut d = directions[i] - directions[i - 1];
        while d > std::f64::consts::PI {
            d -= 2.0 * std::f64::consts::PI;
        }
        while d < -std::f64::consts::PI {
            d += 2.0 * std::f64::consts::PI;
        }
        turns.push(d.abs());
    }

    let theta_mean = mean(&turns);
    let speed_var = variance(&velocities(&steps));

    let curvature = (theta_mean / 0.42 * 100.0).clamp(0.0, 100.0);
    let variability = ((1.0 + speed_var).ln() / 4.0 * 100.0).clamp(0.0, 100.0);

    let linear_penalty = (40.0 - curvature * 0.55).clamp(0.0, 40.0);
    let constant_penalty = (34.0 - variability * 0.45).clamp(0.0, 34.0);
    let chaos_penalty = ((curvature - 92.0) * 0.9).clamp(0.0, 24.0);

    (0.55 * curvature + 0.45 * variability - linear_penalty - constant_penalty - chaos_penalty)
        .clamp(0.0, 100.0)
}

/// Per-timing bell curve: zero under the plausibility minimum, peaking at
/// 1200ms with sigma 700ms.
fn reaction_curve(elapsed_ms: f64) -> f64 {
    if elapsed_ms < REACTION_MIN_MS {
        return 0.0;
    }
    let z = (elapsed_ms - REACTION_PEAK_MS) / REACTION_SIGMA_MS;
    100.0 * (-0.5 * z * z).exp()
}

/// Reaction: rewards human-typical response latency, not too fast, not too
/// slow. Missing timings each cost 10 points off the average.
pub fn reaction_score(timings: &TaskTimings) -> f64 {
    if timings.is_empty() {
        return REACTION_FLOOR;
    }

    let scores: Vec<f64> = timings.iter().map(|(_, ms)| reaction_curve(ms)).collect();
    let missing = TASK_COUNT.saturating_sub(scores.len()) as f64;

    (mean(&scores) - 10.0 * missing).clamp(0.0, 100.0)
}

/// Stability: weighted blend of the final instantaneous stability and the
/// final hold progress recorded by the hold-steady task.
pub fn stability_score(stability_pct: f64, hold_progress_pct: f64) -> f64 {
    (stability_pct * 0.85 + hold_progress_pct * 0.15).clamp(0.0, 100.0)
}

// =============================================================================
// TESTS
// =============================================================================
