//! Challenge engine: three-task state machine
//!
//! Phase transitions:
//! - TILT_LEFT → TILT_RIGHT: roll delta <= -16° held continuously for 240ms
//! - TILT_RIGHT → HOLD_STEADY: roll delta >= +16° held continuously for 240ms
//! - HOLD_STEADY → COMPLETE: 1200ms accumulated inside the deadband
//!
//! Tilt interruptions reset the accumulator to zero; hold excursions decay
//! it at 0.6x rather than resetting, so brief wobbles are recoverable.
//! Completing the three tasks passes the challenge; the score breakdown is
//! diagnostic output, not a gate.

use crate::core::confidence::aggregate;
use crate::core::features::{entropy_score, reaction_score, smoothness_score, stability_score};
use crate::core::sampler::OrientationSampler;
use crate::types::{
    Baseline, Capability, ChallengeEvent, ChallengePhase, ChallengeTask, EngineStatus,
    OrientationEvent, PermissionOutcome, SampleBuffer, ScoreBreakdown, TaskTimings, TickOutput,
    TickReason,
};
use crate::{
    HOLD_DECAY_RATE, HOLD_OFFSET_SCALE, HOLD_RADIUS, HOLD_TARGET_MS, TICK_INTERVAL_MS,
    TILT_HOLD_MS, TILT_THRESHOLD_DEG,
};

/// One challenge run: owns the sampler, the sample buffer, and all task
/// state. Constructed per verification attempt and driven by an external
/// tick loop; nothing in here blocks.
#[derive(Debug)]
pub struct ChallengeEngine {
    sampler: OrientationSampler,
    buffer: SampleBuffer,
    phase: ChallengePhase,
    /// Recaptured from the smoothed angles on every task transition
    baseline: Option<Baseline>,
    task_started_ms: f64,
    tilt_accum_ms: f64,
    hold_accum_ms: f64,
    timings: TaskTimings,
    final_stability_pct: f64,
    final_hold_progress_pct: f64,
    last_tick_ms: Option<f64>,
    breakdown: Option<ScoreBreakdown>,
    completion_emitted: bool,
    tick_count: u64,
}

impl Default for ChallengeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeEngine {
    pub fn new() -> Self {
        Self {
            sampler: OrientationSampler::new(),
            buffer: SampleBuffer::new(),
            phase: ChallengePhase::TiltLeft,
            baseline: None,
            task_started_ms: 0.0,
            tilt_accum_ms: 0.0,
            hold_accum_ms: 0.0,
            timings: TaskTimings::new(),
            final_stability_pct: 0.0,
            final_hold_progress_pct: 0.0,
            last_tick_ms: None,
            breakdown: None,
            completion_emitted: false,
            tick_count: 0,
        }
    }

    /// Start a challenge run with the negotiated capability.
    /// NeedsGesture leaves the engine waiting on `resolve_permission`;
    /// Unsupported is terminal and routes to an alternate method.
    pub fn start(&mut self, capability: Capability, now_ms: f64) -> EngineStatus {
        let status = self.sampler.negotiate(capability);
        if status == EngineStatus::Active {
            self.task_started_ms = now_ms;
        }
        status
    }

    /// Apply the outcome of the one-shot permission request
    pub fn resolve_permission(&mut self, outcome: PermissionOutcome, now_ms: f64) -> EngineStatus {
        let status = self.sampler.resolve_permission(outcome);
        if status == EngineStatus::Active {
            self.task_started_ms = now_ms;
        }
        status
    }

    pub fn status(&self) -> EngineStatus {
        if self.phase == ChallengePhase::Complete {
            EngineStatus::Complete
        } else {
            self.sampler.status()
        }
    }

    pub fn phase(&self) -> ChallengePhase {
        self.phase
    }

    /// Final breakdown, available once complete
    pub fn breakdown(&self) -> Option<&ScoreBreakdown> {
        self.breakdown.as_ref()
    }

    pub fn timings(&self) -> &TaskTimings {
        &self.timings
    }

    /// Current smoothed (pitch, roll), if any reading has arrived
    pub fn smoothed(&self) -> Option<(f64, f64)> {
        self.sampler.smoothed()
    }

    pub fn sample_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Sensor-callback side: overwrite the latest reading
    pub fn submit(&mut self, event: OrientationEvent) {
        self.sampler.submit(event);
    }

    /// Process one scheduler tick. Returns None when the engine is not
    /// active or when the tick arrives inside the 60Hz cap (skipped, not
    /// double-processed).
    pub fn tick(&mut self, now_ms: f64) -> Option<TickOutput> {
        if self.status() != EngineStatus::Active {
            return None;
        }
        if let Some(last) = self.last_tick_ms {
            if now_ms - last < TICK_INTERVAL_MS {
                return None;
            }
        }
        if self.last_tick_ms.is_none() {
            // Anchor the task clock to the driver's clock on the first tick
            self.task_started_ms = now_ms;
        }
        let dt = self.last_tick_ms.map(|last| now_ms - last).unwrap_or(0.0);
        self.last_tick_ms = Some(now_ms);
        self.tick_count += 1;

        let raw = match self.sampler.step() {
            Some(sample) => sample,
            None => {
                return Some(TickOutput::new(
                    self.phase,
                    0.0,
                    0.0,
                    self.hold_accum_ms,
                    0.0,
                    None,
                    TickReason::C001_AWAITING_SAMPLE,
                    vec![],
                ));
            }
        };
        self.buffer.push(raw);

        let (pitch, roll) = self
            .sampler
            .smoothed()
            .unwrap_or((raw.pitch_deg, raw.roll_deg));
        let baseline = *self.baseline.get_or_insert(Baseline::capture(pitch, roll));
        let dpitch = baseline.pitch_delta(pitch);
        let droll = baseline.roll_delta(roll);

        let mut events = Vec::new();
        let (reason, stability_pct) = match self.phase {
            ChallengePhase::TiltLeft | ChallengePhase::TiltRight => {
                let task = match self.phase {
                    ChallengePhase::TiltLeft => ChallengeTask::TiltLeft,
                    _ => ChallengeTask::TiltRight,
                };
                let reason = self.tick_tilt(task, droll, dt, now_ms, pitch, roll, &mut events);
                (reason, None)
            }
            ChallengePhase::HoldSteady => {
                let (reason, stability) = self.tick_hold(dpitch, droll, dt, now_ms, &mut events);
                (reason, Some(stability))
            }
            // status() gates Complete out above
            ChallengePhase::Complete => (TickReason::C005_CHALLENGE_COMPLETE, None),
        };

        // Report the active task's accumulator: the tilt hold during the
        // tilt phases, the steady hold otherwise
        let (accum_ms, progress) = match self.phase {
            ChallengePhase::TiltLeft | ChallengePhase::TiltRight => (
                self.tilt_accum_ms,
                (self.tilt_accum_ms / TILT_HOLD_MS * 100.0).min(100.0),
            ),
            _ => (
                self.hold_accum_ms,
                (self.hold_accum_ms / HOLD_TARGET_MS * 100.0).min(100.0),
            ),
        };
        Some(TickOutput::new(
            self.phase,
            dpitch,
            droll,
            accum_ms,
            progress,
            stability_pct,
            reason,
            events,
        ))
    }

    /// Tilt task rule: the roll delta must exceed the threshold in the
    /// expected direction continuously for the hold duration. Any tick that
    /// breaks the condition resets the accumulator; no partial credit.
    #[allow(clippy::too_many_arguments)]
    fn tick_tilt(
        &mut self,
        task: ChallengeTask,
        droll: f64,
        dt: f64,
        now_ms: f64,
        pitch: f64,
        roll: f64,
        events: &mut Vec<ChallengeEvent>,
    ) -> TickReason {
        let crossed = match task {
            ChallengeTask::TiltLeft => droll <= -TILT_THRESHOLD_DEG,
            _ => droll >= TILT_THRESHOLD_DEG,
        };

        if !crossed {
            let had_progress = self.tilt_accum_ms > 0.0;
            self.tilt_accum_ms = 0.0;
            return if had_progress {
                TickReason::C003_TILT_RESET
            } else {
                TickReason::C002_TILT_SEEKING
            };
        }

        self.tilt_accum_ms += dt;
        if self.tilt_accum_ms < TILT_HOLD_MS {
            return TickReason::C003_TILT_ACCUMULATING;
        }

        let elapsed = now_ms - self.task_started_ms;
        self.timings.record(task, elapsed);
        events.push(ChallengeEvent::TaskCompleted {
            task,
            elapsed_ms: elapsed,
        });
        self.advance(now_ms, pitch, roll);

        match task {
            ChallengeTask::TiltLeft => TickReason::C005_ADVANCE_TO_TILT_RIGHT,
            _ => TickReason::C005_ADVANCE_TO_HOLD_STEADY,
        }
    }

    /// Hold-steady rule: baseline-relative tilt maps to a 2D offset; inside
    /// the deadband the accumulator accrues at full rate, outside it decays
    /// at a reduced rate rather than resetting.
    fn tick_hold(
        &mut self,
        dpitch: f64,
        droll: f64,
        dt: f64,
        now_ms: f64,
        events: &mut Vec<ChallengeEvent>,
    ) -> (TickReason, f64) {
        let dx = droll * HOLD_OFFSET_SCALE;
        let dy = dpitch * HOLD_OFFSET_SCALE;
        let distance = (dx * dx + dy * dy).sqrt();
        let stability = (100.0 * (1.0 - distance / HOLD_RADIUS)).clamp(0.0, 100.0);

        let reason = if distance <= HOLD_RADIUS {
            self.hold_accum_ms += dt;
            TickReason::C004_HOLD_ACCUMULATING
        } else {
            self.hold_accum_ms = (self.hold_accum_ms - dt * HOLD_DECAY_RATE).max(0.0);
            TickReason::C004_HOLD_DECAYING
        };

        if self.hold_accum_ms < HOLD_TARGET_MS {
            return (reason, stability);
        }

        self.final_stability_pct = stability;
        self.final_hold_progress_pct = (self.hold_accum_ms / HOLD_TARGET_MS * 100.0).min(100.0);

        let elapsed = now_ms - self.task_started_ms;
        self.timings.record(ChallengeTask::HoldSteady, elapsed);
        events.push(ChallengeEvent::TaskCompleted {
            task: ChallengeTask::HoldSteady,
            elapsed_ms: elapsed,
        });
        self.complete(events);

        (TickReason::C005_CHALLENGE_COMPLETE, stability)
    }

    /// Advance to the next task: recapture the baseline from the current
    /// smoothed angles and restart the task clock and accumulators
    fn advance(&mut self, now_ms: f64, pitch: f64, roll: f64) {
        self.phase = self.phase.next();
        self.baseline = Some(Baseline::capture(pitch, roll));
        self.task_started_ms = now_ms;
        self.tilt_accum_ms = 0.0;
        self.hold_accum_ms = 0.0;
    }

    /// Run the extractors over the full buffer and timing map, aggregate,
    /// and raise the completion notification exactly once
    fn complete(&mut self, events: &mut Vec<ChallengeEvent>) {
        self.phase = ChallengePhase::Complete;

        let samples = self.buffer.snapshot();
        let entropy = entropy_score(&samples);
        let smoothness = smoothness_score(&samples);
        let reaction = reaction_score(&self.timings);
        let stability = stability_score(self.final_stability_pct, self.final_hold_progress_pct);
        let breakdown = aggregate(entropy, smoothness, reaction, stability);

        if !self.completion_emitted {
            self.completion_emitted = true;
            events.push(ChallengeEvent::ChallengeCompleted {
                breakdown: breakdown.clone(),
            });
        }
        self.breakdown = Some(breakdown);
    }

    /// Full reset back to tilt-left. Clears all timers, accumulators, and
    /// pending notifications synchronously; the capability status survives
    /// (the probe happens once at startup).
    pub fn reset(&mut self) {
        self.sampler.reset();
        self.buffer.clear();
        self.phase = ChallengePhase::TiltLeft;
        self.baseline = None;
        self.task_started_ms = 0.0;
        self.tilt_accum_ms = 0.0;
        self.hold_accum_ms = 0.0;
        self.timings.clear();
        self.final_stability_pct = 0.0;
        self.final_hold_progress_pct = 0.0;
        self.last_tick_ms = None;
        self.breakdown = None;
        self.completion_emitted = false;
        self.tick_count = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_MS: f64 = 17.0;

    fn started() -> ChallengeEngine {
        let mut engine = ChallengeEngine::new();
        engine.start(Capability::Granted, 0.0);
        engine
    }

    /// Start and seed the filter with one level reading. The first reading
    /// both seeds the filter and becomes the tilt-left baseline, so a run
    /// that opens already tilted would measure zero delta forever.
    fn started_level() -> (ChallengeEngine, f64) {
        let mut engine = started();
        drive(&mut engine, 0.0, 0.0, STEP_MS);
        (engine, STEP_MS)
    }

    fn drive(engine: &mut ChallengeEngine, pitch: f64, roll: f64, now_ms: f64) -> Option<TickOutput> {
        engine.submit(OrientationEvent {
            pitch_deg: Some(pitch),
            roll_deg: Some(roll),
            timestamp_ms: now_ms,
        });
        engine.tick(now_ms)
    }

    /// Drive with a constant raw reading until the phase changes or the
    /// tick limit runs out; returns the time cursor.
    fn drive_until_phase(
        engine: &mut ChallengeEngine,
        pitch: f64,
        roll: f64,
        mut now_ms: f64,
        target: ChallengePhase,
        max_ticks: usize,
    ) -> f64 {
        for _ in 0..max_ticks {
            if engine.phase() == target {
                return now_ms;
            }
            now_ms += STEP_MS;
            drive(engine, pitch, roll, now_ms);
        }
        now_ms
    }

    #[test]
    fn test_initial_phase_is_tilt_left() {
        let engine = started();
        assert_eq!(engine.phase(), ChallengePhase::TiltLeft);
        assert_eq!(engine.status(), EngineStatus::Active);
    }

    #[test]
    fn test_idle_engine_ignores_ticks() {
        let mut engine = ChallengeEngine::new();
        assert!(engine.tick(0.0).is_none());
    }

    #[test]
    fn test_denied_permission_is_terminal_no_ticks() {
        let mut engine = ChallengeEngine::new();
        assert_eq!(
            engine.start(Capability::NeedsGesture, 0.0),
            EngineStatus::AwaitingGesture
        );
        assert!(engine.tick(20.0).is_none());
        assert_eq!(
            engine.resolve_permission(PermissionOutcome::Denied, 40.0),
            EngineStatus::Denied
        );
        assert!(engine.tick(60.0).is_none());
    }

    #[test]
    fn test_fast_ticks_are_skipped() {
        let mut engine = started();
        assert!(drive(&mut engine, 0.0, 0.0, 17.0).is_some());
        // 5ms later: inside the 60Hz cap
        assert!(drive(&mut engine, 0.0, 0.0, 22.0).is_none());
        assert_eq!(engine.tick_count(), 1);
    }

    #[test]
    fn test_tilt_left_completes_after_continuous_hold() {
        let (mut engine, start) = started_level();
        let now = drive_until_phase(
            &mut engine,
            0.0,
            -40.0,
            start,
            ChallengePhase::TiltRight,
            200,
        );
        assert_eq!(engine.phase(), ChallengePhase::TiltRight);
        assert!(engine.timings().get(ChallengeTask::TiltLeft).is_some());
        assert!(now > TILT_HOLD_MS);
    }

    #[test]
    fn test_interrupted_tilt_resets_accumulator() {
        let mut engine = started();
        let mut now = 0.0;

        // Seed the filter at level, then tilt hard left for ~120ms
        now += STEP_MS;
        drive(&mut engine, 0.0, 0.0, now);
        let mut crossed = false;
        for _ in 0..60 {
            now += STEP_MS;
            let output = drive(&mut engine, 0.0, -60.0, now).unwrap();
            if output.reason == TickReason::C003_TILT_ACCUMULATING {
                crossed = true;
                if output.hold_ms > 0.0 && output.hold_ms < TILT_HOLD_MS - 60.0 {
                    break;
                }
            }
        }
        assert!(crossed, "tilt never crossed the threshold");
        assert_eq!(engine.phase(), ChallengePhase::TiltLeft);

        // Recover toward level before 240ms of hold: accumulator resets
        let mut reset_seen = false;
        for _ in 0..120 {
            now += STEP_MS;
            let output = drive(&mut engine, 0.0, 40.0, now).unwrap();
            if output.reason == TickReason::C003_TILT_RESET {
                reset_seen = true;
                break;
            }
        }
        assert!(reset_seen, "accumulator never reset");
        assert_eq!(engine.phase(), ChallengePhase::TiltLeft);
        assert!(engine.timings().get(ChallengeTask::TiltLeft).is_none());
    }

    #[test]
    fn test_full_run_reaches_complete_and_emits_once() {
        let (mut engine, start) = started_level();
        let mut now = drive_until_phase(
            &mut engine,
            0.0,
            -40.0,
            start,
            ChallengePhase::TiltRight,
            300,
        );
        now = drive_until_phase(&mut engine, 0.0, 40.0, now, ChallengePhase::HoldSteady, 300);
        assert_eq!(engine.phase(), ChallengePhase::HoldSteady);

        // Hold at the current smoothed angles: distance stays ~0
        let (pitch, roll) = engine.smoothed().unwrap();
        let mut completions = 0;
        for _ in 0..300 {
            now += STEP_MS;
            if let Some(output) = drive(&mut engine, pitch, roll, now) {
                completions += output
                    .events
                    .iter()
                    .filter(|e| matches!(e, ChallengeEvent::ChallengeCompleted { .. }))
                    .count();
            }
            if engine.phase() == ChallengePhase::Complete {
                break;
            }
        }

        assert_eq!(engine.phase(), ChallengePhase::Complete);
        assert_eq!(engine.status(), EngineStatus::Complete);
        assert_eq!(completions, 1);

        let breakdown = engine.breakdown().unwrap();
        assert!(breakdown.confidence <= 100);
        assert_eq!(engine.timings().len(), 3);

        // Terminal: further ticks are ignored
        now += STEP_MS;
        assert!(drive(&mut engine, pitch, roll, now).is_none());
    }

    #[test]
    fn test_hold_excursion_decays_without_reset() {
        let (mut engine, start) = started_level();
        let mut now = drive_until_phase(
            &mut engine,
            0.0,
            -40.0,
            start,
            ChallengePhase::TiltRight,
            300,
        );
        now = drive_until_phase(&mut engine, 0.0, 40.0, now, ChallengePhase::HoldSteady, 300);

        let (pitch, roll) = engine.smoothed().unwrap();

        // Build up some hold time
        for _ in 0..20 {
            now += STEP_MS;
            drive(&mut engine, pitch, roll, now);
        }
        let before;
        {
            now += STEP_MS;
            before = drive(&mut engine, pitch, roll, now).unwrap().hold_ms;
        }
        assert!(before > 0.0);

        // Jerk far outside the deadband for one tick: decays, not resets.
        // The smoothing filter passes ~9% of the raw jump through per tick,
        // so the raw excursion has to be large to clear the deadband at once.
        now += STEP_MS;
        let output = drive(&mut engine, pitch + 90.0, roll + 90.0, now).unwrap();
        assert_eq!(output.reason, TickReason::C004_HOLD_DECAYING);
        assert!(output.hold_ms < before);
        assert!(output.hold_ms > before - STEP_MS);
        assert_eq!(engine.phase(), ChallengePhase::HoldSteady);
    }

    #[test]
    fn test_baseline_recaptured_on_advance() {
        let (mut engine, start) = started_level();
        drive_until_phase(&mut engine, 0.0, -40.0, start, ChallengePhase::TiltRight, 300);

        // Next tick's deltas are relative to the new baseline, so they are
        // near zero even though the device is still tilted
        let (pitch, roll) = engine.smoothed().unwrap();
        let mut now = 10_000.0;
        now += STEP_MS;
        let output = drive(&mut engine, pitch, roll, now).unwrap();
        assert!(output.roll_delta_deg.abs() < 2.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut engine, start) = started_level();
        drive_until_phase(&mut engine, 0.0, -40.0, start, ChallengePhase::TiltRight, 300);
        assert!(engine.timings().len() > 0);

        engine.reset();
        assert_eq!(engine.phase(), ChallengePhase::TiltLeft);
        assert_eq!(engine.status(), EngineStatus::Active);
        assert_eq!(engine.timings().len(), 0);
        assert_eq!(engine.sample_count(), 0);
        assert_eq!(engine.tick_count(), 0);
        assert!(engine.breakdown().is_none());
    }

    #[test]
    fn test_malformed_events_never_fault_the_tick_loop() {
        let mut engine = started();
        engine.submit(OrientationEvent {
            pitch_deg: None,
            roll_deg: None,
            timestamp_ms: 17.0,
        });
        let output = engine.tick(17.0).unwrap();
        assert_eq!(output.reason, TickReason::C001_AWAITING_SAMPLE);
        assert_eq!(engine.phase(), ChallengePhase::TiltLeft);
    }
}
