//! Pipeline Orchestrator: Analysis → generation → repair → validation.
//!
//! One run per request moves strictly through
//! `Received → Generating → Repairing → Validating → Done | Failed`.
//! A `Done` run always carries its validation report, passed or not; a
//! `Failed` run carries exactly one categorized error and no profile.

pub mod handlers;
mod orchestrator;

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::generation::analysis::JobAnalysis;
use crate::generation::client::GenerationError;
use crate::generation::fit::FitReport;
use crate::models::profile::GeneratedProfile;
use crate::validation::ValidationReport;

pub use orchestrator::Orchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Generating,
    Repairing,
    Validating,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Received => "received",
            Self::Generating => "generating",
            Self::Repairing => "repairing",
            Self::Validating => "validating",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Generation, retries included, ran past the wall-clock budget.
    #[error("generation did not finish within its {}s budget", .budget.as_secs())]
    Timeout { budget: Duration },

    #[error("request was cancelled")]
    Cancelled,
}

/// Terminal `Failed` state: the stage that failed and why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pipeline failed while {stage}: {error}")]
pub struct PipelineFailure {
    pub stage: Stage,
    pub error: PipelineError,
}

impl PipelineFailure {
    pub fn new(stage: Stage, error: impl Into<PipelineError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

/// Terminal `Done` state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationOutcome {
    /// Id of the run that produced this outcome. Deduplicated callers share it.
    pub request_id: Uuid,
    pub fingerprint: String,
    pub profile: GeneratedProfile,
    pub report: ValidationReport,
    /// `None` when the generator produced an empty document.
    pub repair_strategy: Option<&'static str>,
    pub analysis: JobAnalysis,
    pub fit: FitReport,
    pub stages: Vec<Stage>,
    pub model: String,
}
