//! Capability negotiation and engine lifecycle status
//!
//! The platform's orientation capability is probed once at startup and the
//! result is carried everywhere as a plain enum. A refused or absent
//! capability is a terminal routing state, never an error: the embedding UI
//! is expected to offer an alternate verification path.

use serde::{Deserialize, Serialize};

/// Result of the one-time capability probe at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Stream is active immediately
    Granted,
    /// Platform requires a user-initiated permission request first
    NeedsGesture,
    /// No orientation capability on this device
    Unsupported,
}

/// Outcome of the asynchronous permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOutcome {
    Granted,
    Denied,
}

/// Lifecycle status of a challenge engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineStatus {
    /// Constructed, not started
    Idle,
    /// Waiting on the one-shot permission request
    AwaitingGesture,
    /// Tick loop running, challenge in progress
    Active,
    /// All three tasks done, breakdown available
    Complete,
    /// Permission refused; terminal, route to an alternate method
    Denied,
    /// No sensor capability; terminal, route to an alternate method
    Unsupported,
}

impl EngineStatus {
    /// Terminal states accept no further ticks or permission outcomes
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngineStatus::Complete | EngineStatus::Denied | EngineStatus::Unsupported
        )
    }
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineStatus::Idle => "IDLE",
            EngineStatus::AwaitingGesture => "AWAITING_GESTURE",
            EngineStatus::Active => "ACTIVE",
            EngineStatus::Complete => "COMPLETE",
            EngineStatus::Denied => "DENIED",
            EngineStatus::Unsupported => "UNSUPPORTED",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// TESTS
// =============================================================================
