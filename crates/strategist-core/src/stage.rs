//! Stage interface and failure isolation

use crate::{PipelinePhase, Result, SharedState, StageError, StateField, StateUpdate};
use async_trait::async_trait;
use tracing::warn;

/// A unit of work in the pipeline
///
/// A stage reads what it needs from the shared state, calls its collaborator
/// and returns a partial update holding only the fields it owns.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name used in logs and contract errors
    fn name(&self) -> &'static str;

    /// Phase of the driver during which this stage runs
    fn phase(&self) -> PipelinePhase;

    /// Fields this stage is allowed to write
    fn owned_fields(&self) -> &'static [StateField];

    /// Run the stage against the current state
    async fn run(&self, state: &SharedState) -> Result<StateUpdate>;
}

/// A data-gathering stage whose failures degrade to a placeholder
///
/// Implementors provide the fallible body (`gather`) and the placeholder
/// (`degrade`). Wrapping the stage in [`Recovering`] yields a [`Stage`] that
/// never returns an error.
#[async_trait]
pub trait GatherStage: Send + Sync {
    /// Value stored in the owned field
    type Output: Send;

    /// Fields written by [`GatherStage::into_update`]
    const OWNED: &'static [StateField];

    fn name(&self) -> &'static str;

    fn phase(&self) -> PipelinePhase;

    /// Fallible body of the stage
    async fn gather(&self, state: &SharedState) -> Result<Self::Output>;

    /// Placeholder substituted when `gather` fails
    fn degrade(&self, error: &StageError) -> Self::Output;

    fn into_update(&self, output: Self::Output) -> StateUpdate;
}

/// Adapter running a [`GatherStage`] with local failure recovery
#[derive(Debug, Clone)]
pub struct Recovering<S>(S);

impl<S: GatherStage> Recovering<S> {
    pub fn new(stage: S) -> Self {
        Self(stage)
    }
}

#[async_trait]
impl<S: GatherStage> Stage for Recovering<S> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn phase(&self) -> PipelinePhase {
        self.0.phase()
    }

    fn owned_fields(&self) -> &'static [StateField] {
        S::OWNED
    }

    async fn run(&self, state: &SharedState) -> Result<StateUpdate> {
        let output = match self.0.gather(state).await {
            Ok(output) => output,
            Err(error) => {
                warn!(
                    stage = self.0.name(),
                    instrument = state.instrument_id(),
                    %error,
                    "Stage degraded to placeholder"
                );
                self.0.degrade(&error)
            }
        };
        Ok(self.0.into_update(output))
    }
}
