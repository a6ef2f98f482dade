//! Error types for strategist-core

use crate::state::StateField;
use thiserror::Error;

/// Result type alias for stage operations
pub type Result<T> = std::result::Result<T, StageError>;

/// Failure raised inside a stage
///
/// `DataUnavailable` and `ProviderUnreachable` are recovered at the stage
/// boundary and turned into placeholders. `ReasoningFailure` is the only
/// variant that reaches the driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// Price history was empty or too short to compute indicators
    #[error("Data not available for {instrument}: {reason}")]
    DataUnavailable { instrument: String, reason: String },

    /// A data collaborator failed, timed out or answered with a non-success status
    #[error("{provider} unreachable: {reason}")]
    ProviderUnreachable { provider: String, reason: String },

    /// The reasoning collaborator could not produce a report
    #[error("Reasoning failed: {0}")]
    ReasoningFailure(String),
}

impl StageError {
    /// Create a `ProviderUnreachable` error
    pub fn unreachable(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::ProviderUnreachable {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure can be absorbed into a placeholder
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ReasoningFailure(_))
    }
}

/// Violation of the merge contract
///
/// These indicate a bug in a stage implementation, not a runtime fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The field already holds a different value
    #[error("Field `{0}` was already written with a different value")]
    AlreadyWritten(StateField),

    /// The stage returned a field it does not own
    #[error("Stage `{stage}` does not own field `{field}`")]
    NotOwned {
        stage: &'static str,
        field: StateField,
    },
}
