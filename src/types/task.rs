//! Challenge tasks and recorded task timings

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Total number of tasks in one challenge run
pub const TASK_COUNT: usize = 3;

/// The three physical tasks of a challenge run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeTask {
    TiltLeft,
    TiltRight,
    HoldSteady,
}

impl ChallengeTask {
    /// Instruction shown to the user for this task
    pub fn instruction(&self) -> &'static str {
        match self {
            ChallengeTask::TiltLeft => "Tilt the device to the LEFT",
            ChallengeTask::TiltRight => "Tilt the device to the RIGHT",
            ChallengeTask::HoldSteady => "Hold the device STEADY",
        }
    }
}

impl std::fmt::Display for ChallengeTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChallengeTask::TiltLeft => "tilt-left",
            ChallengeTask::TiltRight => "tilt-right",
            ChallengeTask::HoldSteady => "hold-steady",
        };
        write!(f, "{}", name)
    }
}

/// Elapsed milliseconds from task start to completion, per task.
///
/// Insert-once: a task completes at most once per challenge run, so a second
/// record for the same task is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskTimings {
    timings: HashMap<ChallengeTask, f64>,
}

impl TaskTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a timing. Returns false if the task already has one.
    pub fn record(&mut self, task: ChallengeTask, elapsed_ms: f64) -> bool {
        if self.timings.contains_key(&task) {
            return false;
        }
        self.timings.insert(task, elapsed_ms);
        true
    }

    pub fn get(&self, task: ChallengeTask) -> Option<f64> {
        self.timings.get(&task).copied()
    }

    pub fn len(&self) -> usize {
        self.timings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }

    /// Iterate recorded timings (unordered)
    pub fn iter(&self) -> impl Iterator<Item = (ChallengeTask, f64)> + '_ {
        self.timings.iter().map(|(task, ms)| (*task, *ms))
    }

    pub fn clear(&mut self) {
        self.timings.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_once() {
        let mut timings = TaskTimings::new();
        assert!(timings.record(ChallengeTask::TiltLeft, 850.0));
        assert!(!timings.record(ChallengeTask::TiltLeft, 999.0));
        assert_eq!(timings.get(ChallengeTask::TiltLeft), Some(850.0));
        assert_eq!(timings.len(), 1);
    }

    #[test]
    fn test_missing_task_is_none() {
        let timings = TaskTimings::new();
        assert_eq!(timings.get(ChallengeTask::HoldSteady), None);
        assert!(timings.is_empty());
    }
}
