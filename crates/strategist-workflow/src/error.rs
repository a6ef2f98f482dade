//! Error types for strategist-workflow

use strategist_core::{MergeError, PipelinePhase, StageError, StateField};
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that end a pipeline run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A stage failed in a way that cannot be absorbed into a placeholder
    #[error("Pipeline aborted during {phase}: {source}")]
    Aborted {
        phase: PipelinePhase,
        source: StageError,
    },

    /// A stage broke the merge contract
    #[error("Stage contract violated: {0}")]
    Contract(#[from] MergeError),

    /// A stage was scheduled outside the linear phase order
    #[error("Stage '{stage}' runs in {found} but the next phase is {expected}")]
    OutOfOrder {
        stage: &'static str,
        expected: PipelinePhase,
        found: PipelinePhase,
    },

    /// The driver finished its stages with data fields still unwritten
    #[error("Pipeline finished with unwritten fields: {}", join_fields(.0))]
    Incomplete(Vec<StateField>),

    /// The pipeline could not be assembled
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// Phase in which the run stopped, when known
    pub fn phase(&self) -> Option<PipelinePhase> {
        match self {
            Self::Aborted { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

fn join_fields(fields: &[StateField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while rendering prompts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// Template rendering failed
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },
}

impl From<PromptError> for StageError {
    fn from(err: PromptError) -> Self {
        StageError::ReasoningFailure(err.to_string())
    }
}
