//! Core modules for Tiltlock

pub mod api;
pub mod challenge;
pub mod confidence;
pub mod features;
pub mod risk;
pub mod sampler;

pub use api::{create_router, run_server};
pub use challenge::ChallengeEngine;
pub use confidence::aggregate;
pub use features::{entropy_score, reaction_score, smoothness_score, stability_score};
pub use risk::evaluate_risk;
pub use sampler::{await_permission, OrientationSampler};
