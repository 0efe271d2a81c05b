//! Tiltlock: motion-based human verification
//!
//! Challenges the user to tilt the device left, tilt right, then hold it
//! steady, and watches the orientation signal while they do. Completing the
//! three tasks passes the challenge; a four-factor confidence score
//! (entropy, smoothness, reaction, stability) travels alongside the result
//! as diagnostic output.

pub mod core;
pub mod types;

// =============================================================================
// SMOOTHING & SCHEDULING [C]
// =============================================================================

/// Exponential smoothing factor applied once per tick:
/// smoothed += (raw - smoothed) * k
pub const SMOOTHING_FACTOR: f64 = 0.09;

/// Minimum interval between processed ticks (60Hz cap).
/// Ticks arriving faster than this are skipped, not double-processed.
pub const TICK_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Sample buffer capacity (~2.6s at 60Hz)
pub const SAMPLE_BUFFER_CAP: usize = 160;

// =============================================================================
// CHALLENGE THRESHOLDS [C]
// =============================================================================

/// Roll delta (degrees, baseline-relative) a tilt task must exceed
pub const TILT_THRESHOLD_DEG: f64 = 16.0;

/// How long a tilt must be held past the threshold (milliseconds).
/// Any tick that breaks the condition resets the accumulator to zero.
pub const TILT_HOLD_MS: f64 = 240.0;

/// Target steady-hold duration (milliseconds)
pub const HOLD_TARGET_MS: f64 = 1200.0;

/// Offset units per degree of baseline-relative tilt in the hold task
pub const HOLD_OFFSET_SCALE: f64 = 6.0;

/// Deadband radius for the hold task, in offset units (8 degrees at scale 6)
pub const HOLD_RADIUS: f64 = 48.0;

/// Accumulator decay rate while outside the deadband, relative to accrual.
/// Brief excursions are recoverable, unlike the discrete tilt tasks.
pub const HOLD_DECAY_RATE: f64 = 0.6;

// =============================================================================
// FEATURE EXTRACTION [C]
// =============================================================================

/// Minimum samples required for entropy/smoothness extraction
pub const MIN_FEATURE_SAMPLES: usize = 8;

/// Per-pair dt clamp (milliseconds), guards against stalled sensor delivery
pub const DT_MIN_MS: f64 = 8.0;
pub const DT_MAX_MS: f64 = 60.0;

/// Fixed floors returned when there is too little data to extract
pub const ENTROPY_FLOOR: f64 = 12.0;
pub const SMOOTHNESS_FLOOR: f64 = 10.0;
pub const REACTION_FLOOR: f64 = 10.0;

/// Reaction bell curve: timings under the minimum score zero (implausibly
/// fast); otherwise 100 * exp(-0.5 * ((t - peak) / sigma)^2)
pub const REACTION_MIN_MS: f64 = 180.0;
pub const REACTION_PEAK_MS: f64 = 1200.0;
pub const REACTION_SIGMA_MS: f64 = 700.0;

// =============================================================================
// CONFIDENCE WEIGHTS [C] - sum = 1.0
// =============================================================================

pub const WEIGHT_ENTROPY: f64 = 0.26;
pub const WEIGHT_SMOOTHNESS: f64 = 0.20;
pub const WEIGHT_REACTION: f64 = 0.24;
pub const WEIGHT_STABILITY: f64 = 0.30;

/// Risk bucket boundaries (inclusive on the low side)
pub const CONFIDENCE_LOW_RISK: u32 = 80;
pub const CONFIDENCE_MEDIUM_RISK: u32 = 55;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
