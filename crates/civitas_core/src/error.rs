//! Error types for the simulation engine.
//!
//! Per-agent and per-meeting failures never surface as errors from the day
//! clock; these types cover the decision-source boundary, experiment lifecycle
//! misuse and lookups through the engine's public surface.

use thiserror::Error;
use uuid::Uuid;

/// Failure of the external decision source for one request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    /// No credential or configuration is present.
    #[error("Decision source unavailable: {0}")]
    Unavailable(String),

    /// The upstream call failed.
    #[error("Decision source upstream error: {0}")]
    Upstream(String),

    /// The upstream call succeeded but carried no text.
    #[error("Decision source returned an empty response")]
    EmptyResponse,
}

impl DecisionError {
    #[must_use]
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        Self::Unavailable(msg.into())
    }

    #[must_use]
    pub fn upstream<S: Into<String>>(msg: S) -> Self {
        Self::Upstream(msg.into())
    }
}

/// Experiment lifecycle and export errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// `start_experiment` was called while another run is recording.
    #[error("Experiment run {run_id} is already active; end it before starting another")]
    ExperimentAlreadyActive { run_id: String },

    #[error("No experiment run is active")]
    NoActiveExperiment,

    /// CSV export needs at least one snapshot for its header.
    #[error("Experiment run {run_id} has no snapshots")]
    EmptyRun { run_id: String },

    #[error("Experiment config is invalid: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from engine operations addressed by id.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Constitutional violation not found: {0}")]
    ViolationNotFound(Uuid),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),
}
