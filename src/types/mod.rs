//! Core types for Tiltlock

mod buffer;
mod capability;
mod output;
mod phase;
mod risk;
mod sample;
mod score;
mod task;

pub use buffer::SampleBuffer;
pub use capability::{Capability, EngineStatus, PermissionOutcome};
pub use output::{ChallengeEvent, TickOutput, TickReason};
pub use phase::ChallengePhase;
pub use risk::{RiskAssessment, RiskRequest, StepUp};
pub use sample::{Baseline, OrientationEvent, OrientationSample};
pub use score::{RiskLevel, ScoreBreakdown};
pub use task::{ChallengeTask, TaskTimings, TASK_COUNT};
