//! Wizard-level error types

use thiserror::Error;

use crate::engine::{EngineError, PipelinePhase};

/// A configuration push that failed after its single retry. Surfaced as a
/// non-blocking warning; navigation is never held up by it.
#[derive(Debug, Error)]
#[error("failed to push {field} to engine: {cause}")]
pub struct ConfigPushError {
    pub field: &'static str,
    #[source]
    pub cause: EngineError,
}

/// A preview request the engine rejected. The fixture is omitted from the
/// display; no user-visible error is required.
#[derive(Debug, Error)]
#[error("preview failed for fixture {fixture_id}: {cause}")]
pub struct PreviewError {
    pub fixture_id: usize,
    #[source]
    pub cause: EngineError,
}

/// A failed processing run as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFailure {
    pub phase: PipelinePhase,
    pub message: String,
}

impl std::fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase, self.message)
    }
}
