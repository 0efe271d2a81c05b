//! Integration tests for the scoring pipeline
//!
//! Extractors and aggregator as one path: sample snapshot + timing map →
//! four feature scores → breakdown.

use pretty_assertions::assert_eq;

use tiltlock::core::{
    aggregate, entropy_score, reaction_score, smoothness_score, stability_score,
};
use tiltlock::types::{ChallengeTask, OrientationSample, RiskLevel, TaskTimings};

/// A wobbly, human-looking trace at ~60Hz
fn human_trace(n: usize) -> Vec<OrientationSample> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 16.6;
            OrientationSample::new(
                3.5 * (t / 210.0).sin() + 0.9 * (t / 53.0).sin(),
                -12.0 * (t / 430.0).sin() + 1.1 * (t / 67.0).cos(),
                t,
            )
        })
        .collect()
}

fn full_timings() -> TaskTimings {
    let mut timings = TaskTimings::new();
    timings.record(ChallengeTask::TiltLeft, 950.0);
    timings.record(ChallengeTask::TiltRight, 1400.0);
    timings.record(ChallengeTask::HoldSteady, 1850.0);
    timings
}

#[test]
fn test_all_scores_in_range_for_valid_input() {
    let trace = human_trace(150);
    let timings = full_timings();

    let entropy = entropy_score(&trace);
    let smoothness = smoothness_score(&trace);
    let reaction = reaction_score(&timings);
    let stability = stability_score(88.0, 100.0);

    for (name, score) in [
        ("entropy", entropy),
        ("smoothness", smoothness),
        ("reaction", reaction),
        ("stability", stability),
    ] {
        assert!(
            (0.0..=100.0).contains(&score),
            "{} out of range: {}",
            name,
            score
        );
    }

    let breakdown = aggregate(entropy, smoothness, reaction, stability);
    assert!(breakdown.confidence <= 100);
    assert_eq!(
        breakdown.risk_level,
        RiskLevel::from_confidence(breakdown.confidence)
    );
}

#[test]
fn test_scoring_is_idempotent() {
    let trace = human_trace(120);
    let timings = full_timings();

    let first = aggregate(
        entropy_score(&trace),
        smoothness_score(&trace),
        reaction_score(&timings),
        stability_score(91.0, 100.0),
    );
    let second = aggregate(
        entropy_score(&trace),
        smoothness_score(&trace),
        reaction_score(&timings),
        stability_score(91.0, 100.0),
    );
    assert_eq!(first, second);
}

#[test]
fn test_short_buffer_floors_independent_of_content() {
    let tiny = human_trace(7);
    assert_eq!(entropy_score(&tiny), 12.0);
    assert_eq!(smoothness_score(&tiny), 10.0);

    let empty: Vec<OrientationSample> = Vec::new();
    assert_eq!(entropy_score(&empty), 12.0);
    assert_eq!(smoothness_score(&empty), 10.0);
}

#[test]
fn test_empty_timing_map_floor() {
    assert_eq!(reaction_score(&TaskTimings::new()), 10.0);
}

#[test]
fn test_reaction_bell_peak() {
    // A single timing of exactly 1200ms contributes the curve peak (100),
    // then loses 10 per missing timing
    let mut timings = TaskTimings::new();
    timings.record(ChallengeTask::TiltLeft, 1200.0);
    assert!((reaction_score(&timings) - 80.0).abs() < 1e-9);
}

#[test]
fn test_reaction_punishes_implausible_speed() {
    let mut fast = TaskTimings::new();
    fast.record(ChallengeTask::TiltLeft, 100.0);
    fast.record(ChallengeTask::TiltRight, 120.0);
    fast.record(ChallengeTask::HoldSteady, 90.0);

    let mut human = full_timings();
    assert!(reaction_score(&fast) < reaction_score(&human));
    assert_eq!(reaction_score(&fast), 0.0);

    // And very slow responses fall off the far side of the bell
    human = TaskTimings::new();
    human.record(ChallengeTask::TiltLeft, 8000.0);
    human.record(ChallengeTask::TiltRight, 9000.0);
    human.record(ChallengeTask::HoldSteady, 8500.0);
    assert!(reaction_score(&human) < 1.0);
}

#[test]
fn test_stability_extremes() {
    assert_eq!(stability_score(100.0, 100.0), 100.0);
    assert_eq!(stability_score(0.0, 0.0), 0.0);
}

#[test]
fn test_risk_bucketing_boundaries() {
    assert_eq!(aggregate(80.0, 80.0, 80.0, 80.0).risk_level, RiskLevel::Low);
    assert_eq!(
        aggregate(55.0, 55.0, 55.0, 55.0).risk_level,
        RiskLevel::Medium
    );
    assert_eq!(
        aggregate(54.0, 54.0, 54.0, 54.0).risk_level,
        RiskLevel::High
    );
}

#[test]
fn test_robotic_trace_scores_below_human_trace() {
    // Perfectly linear, constant-speed sweep: no curvature, no variability
    let robotic: Vec<OrientationSample> = (0..150)
        .map(|i| {
            let t = i as f64 * 16.6;
            OrientationSample::new(0.0, -0.25 * i as f64, t)
        })
        .collect();
    let human = human_trace(150);

    assert!(smoothness_score(&robotic) <= smoothness_score(&human));
}
