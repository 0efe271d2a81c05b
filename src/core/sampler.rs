//! Orientation sampler: latest-reading cell and exponential smoothing
//!
//! The platform stream delivers at sensor-native rate (60-200Hz) from its
//! own callback context; the sampler keeps only the latest validated
//! reading (last-write-wins) and the tick loop consumes it once per tick.
//! Intermediate readings between ticks are intentionally dropped rather
//! than queued, bounding per-tick work regardless of sensor rate.

use tokio::sync::oneshot;

use crate::types::{Capability, EngineStatus, OrientationEvent, OrientationSample};
use crate::SMOOTHING_FACTOR;

/// Stateful sampler owning capability status, the latest raw reading, and
/// the smoothed angle pair.
#[derive(Debug)]
pub struct OrientationSampler {
    status: EngineStatus,
    /// Last-write-wins cell written by the sensor callback
    latest: Option<OrientationSample>,
    raw: Option<(f64, f64)>,
    smoothed: Option<(f64, f64)>,
    k: f64,
    /// Malformed events skipped (null angle fields)
    skipped: u64,
}

impl Default for OrientationSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationSampler {
    pub fn new() -> Self {
        Self {
            status: EngineStatus::Idle,
            latest: None,
            raw: None,
            smoothed: None,
            k: SMOOTHING_FACTOR,
            skipped: 0,
        }
    }

    /// Resolve the startup capability probe. NeedsGesture leaves the sampler
    /// waiting on a one-shot permission request; Unsupported is terminal.
    pub fn negotiate(&mut self, capability: Capability) -> EngineStatus {
        self.status = match capability {
            Capability::Granted => EngineStatus::Active,
            Capability::NeedsGesture => EngineStatus::AwaitingGesture,
            Capability::Unsupported => EngineStatus::Unsupported,
        };
        self.status
    }

    /// Apply the outcome of the permission request. A refusal transitions to
    /// the terminal Denied status; it is never surfaced as an error.
    pub fn resolve_permission(&mut self, outcome: crate::types::PermissionOutcome) -> EngineStatus {
        if self.status == EngineStatus::AwaitingGesture {
            self.status = match outcome {
                crate::types::PermissionOutcome::Granted => EngineStatus::Active,
                crate::types::PermissionOutcome::Denied => EngineStatus::Denied,
            };
        }
        self.status
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Sensor-callback side: overwrite the latest reading. Events with null
    /// angle fields are counted and skipped, never propagated as zero.
    pub fn submit(&mut self, event: OrientationEvent) {
        match event.to_sample() {
            Some(sample) => self.latest = Some(sample),
            None => self.skipped += 1,
        }
    }

    /// Tick side: consume the latest reading and run one smoothing step:
    /// smoothed += (raw - smoothed) * k. Returns the raw sample consumed,
    /// or None when no reading has arrived yet.
    pub fn step(&mut self) -> Option<OrientationSample> {
        let sample = self.latest?;
        self.raw = Some((sample.pitch_deg, sample.roll_deg));
        self.smoothed = Some(match self.smoothed {
            Some((pitch, roll)) => (
                pitch + (sample.pitch_deg - pitch) * self.k,
                roll + (sample.roll_deg - roll) * self.k,
            ),
            // First reading seeds the filter
            None => (sample.pitch_deg, sample.roll_deg),
        });
        Some(sample)
    }

    /// Latest raw (pitch, roll), if any reading has arrived
    pub fn raw(&self) -> Option<(f64, f64)> {
        self.raw
    }

    /// Smoothed (pitch, roll), if any reading has arrived
    pub fn smoothed(&self) -> Option<(f64, f64)> {
        self.smoothed
    }

    /// Count of malformed events skipped
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Clear readings and filter state; capability status survives a reset
    /// (the probe happens once at startup).
    pub fn reset(&mut self) {
        self.latest = None;
        self.raw = None;
        self.smoothed = None;
        self.skipped = 0;
    }
}

/// Await the one-shot permission request. This is the only suspension point
/// in the engine; a dropped sender resolves to Denied, which makes the
/// request cancellable without a separate error path.
pub async fn await_permission(
    rx: oneshot::Receiver<crate::types::PermissionOutcome>,
) -> crate::types::PermissionOutcome {
    rx.await.unwrap_or(crate::types::PermissionOutcome::Denied)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PermissionOutcome;

    fn event(pitch: f64, roll: f64, ts: f64) -> OrientationEvent {
        OrientationEvent {
            pitch_deg: Some(pitch),
            roll_deg: Some(roll),
            timestamp_ms: ts,
        }
    }

    #[test]
    fn test_negotiate_granted_activates() {
        let mut sampler = OrientationSampler::new();
        assert_eq!(sampler.negotiate(Capability::Granted), EngineStatus::Active);
    }

    #[test]
    fn test_negotiate_unsupported_is_terminal() {
        let mut sampler = OrientationSampler::new();
        assert_eq!(
            sampler.negotiate(Capability::Unsupported),
            EngineStatus::Unsupported
        );
        // A late permission outcome must not revive the sampler
        assert_eq!(
            sampler.resolve_permission(PermissionOutcome::Granted),
            EngineStatus::Unsupported
        );
    }

    #[test]
    fn test_permission_denied_is_not_an_error() {
        let mut sampler = OrientationSampler::new();
        sampler.negotiate(Capability::NeedsGesture);
        assert_eq!(sampler.status(), EngineStatus::AwaitingGesture);
        assert_eq!(
            sampler.resolve_permission(PermissionOutcome::Denied),
            EngineStatus::Denied
        );
    }

    #[test]
    fn test_first_reading_seeds_filter() {
        let mut sampler = OrientationSampler::new();
        sampler.submit(event(10.0, -5.0, 0.0));
        sampler.step();
        assert_eq!(sampler.smoothed(), Some((10.0, -5.0)));
    }

    #[test]
    fn test_smoothing_moves_toward_raw() {
        let mut sampler = OrientationSampler::new();
        sampler.submit(event(0.0, 0.0, 0.0));
        sampler.step();
        sampler.submit(event(0.0, 10.0, 16.0));
        sampler.step();

        let (_, roll) = sampler.smoothed().unwrap();
        assert!((roll - 10.0 * SMOOTHING_FACTOR).abs() < 1e-9);
        assert_eq!(sampler.raw(), Some((0.0, 10.0)));
    }

    #[test]
    fn test_latest_write_wins() {
        let mut sampler = OrientationSampler::new();
        sampler.submit(event(1.0, 1.0, 0.0));
        sampler.submit(event(2.0, 2.0, 5.0));
        sampler.submit(event(3.0, 3.0, 10.0));
        let consumed = sampler.step().unwrap();
        assert_eq!(consumed.roll_deg, 3.0);
    }

    #[test]
    fn test_malformed_events_skipped() {
        let mut sampler = OrientationSampler::new();
        sampler.submit(OrientationEvent {
            pitch_deg: None,
            roll_deg: Some(1.0),
            timestamp_ms: 0.0,
        });
        assert!(sampler.step().is_none());
        assert_eq!(sampler.skipped(), 1);
    }

    #[tokio::test]
    async fn test_await_permission_dropped_sender_denies() {
        let (tx, rx) = oneshot::channel::<PermissionOutcome>();
        drop(tx);
        assert_eq!(await_permission(rx).await, PermissionOutcome::Denied);
    }

    #[tokio::test]
    async fn test_await_permission_granted() {
        let (tx, rx) = oneshot::channel();
        tx.send(PermissionOutcome::Granted).unwrap();
        assert_eq!(await_permission(rx).await, PermissionOutcome::Granted);
    }
}
