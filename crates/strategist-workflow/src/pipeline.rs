//! Pipeline driver
//!
//! Runs the four stages in their fixed order against one [`SharedState`]:
//!
//! 1. Technicals (price history and indicators)
//! 2. News (latest headlines)
//! 3. Web strategy (strategy commentary)
//! 4. Synthesis (reasoning call producing the report)
//!
//! The data stages never fail; their faults become placeholders. A failure of
//! the synthesis stage aborts the run with no report.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::stages::{NewsStage, SynthesisStage, TechnicalsStage, WebStrategyStage};
use serde::Serialize;
use std::sync::Arc;
use strategist_core::{
    MergeError, PipelinePhase, Recovering, SharedState, Stage, StateField, StateUpdate,
};
use strategist_llm::LLMProvider;
use strategist_market::{NewsSearch, PriceHistory, WebSearch};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Whether a stage produced real data or a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    Degraded,
}

/// Result of one stage within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: &'static str,
    pub phase: PipelinePhase,
    pub status: StageStatus,
}

/// What happened during a run, for logs and display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Every phase entered, in order, ending with `Done` or `Aborted`
    pub trail: Vec<PipelinePhase>,
    pub stages: Vec<StageOutcome>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            trail: vec![PipelinePhase::Init],
            stages: Vec::new(),
        }
    }

    /// Number of stages that fell back to a placeholder
    pub fn degraded_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|outcome| outcome.status == StageStatus::Degraded)
            .count()
    }
}

/// Terminal outcome of [`Pipeline::execute`]
#[derive(Debug, Clone)]
pub enum Execution {
    /// Every stage ran; the state holds all four fields
    Done {
        state: SharedState,
        summary: RunSummary,
    },
    /// The run stopped; `state` holds whatever was merged before the failure
    /// and never a report
    Aborted {
        state: SharedState,
        error: PipelineError,
        summary: RunSummary,
    },
}

impl Execution {
    pub fn state(&self) -> &SharedState {
        match self {
            Self::Done { state, .. } | Self::Aborted { state, .. } => state,
        }
    }

    pub fn summary(&self) -> &RunSummary {
        match self {
            Self::Done { summary, .. } | Self::Aborted { summary, .. } => summary,
        }
    }

    /// Phases entered during the run
    pub fn trail(&self) -> &[PipelinePhase] {
        &self.summary().trail
    }

    /// `Done` or `Aborted`
    pub fn phase(&self) -> PipelinePhase {
        match self {
            Self::Done { .. } => PipelinePhase::Done,
            Self::Aborted { .. } => PipelinePhase::Aborted,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    pub fn into_result(self) -> Result<SharedState> {
        match self {
            Self::Done { state, .. } => Ok(state),
            Self::Aborted { error, .. } => Err(error),
        }
    }
}

/// Sequential analysis pipeline
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use strategist_llm::providers::GeminiProvider;
/// use strategist_market::{TavilySearch, TradingViewNews, YahooPriceHistory};
/// use strategist_workflow::{Pipeline, PipelineConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = PipelineConfig::default();
/// let pipeline = Pipeline::builder()
///     .price_history(Arc::new(YahooPriceHistory::new()))
///     .news_search(Arc::new(TradingViewNews::new(&config.market)?))
///     .web_search(Arc::new(TavilySearch::new(&config.market)?))
///     .llm_provider(Arc::new(GeminiProvider::from_env()?))
///     .config(config)
///     .build()?;
///
/// let report = pipeline.run("EURUSD=X", "EURUSD").await?;
/// println!("{report}");
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Names of the stages in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Analyze one instrument and return the markdown report
    pub async fn run(&self, instrument_id: &str, symbol_name: &str) -> Result<String> {
        let state = self
            .execute(SharedState::new(instrument_id, symbol_name))
            .await
            .into_result()?;

        state
            .into_report()
            .ok_or_else(|| PipelineError::Incomplete(vec![StateField::FinalReport]))
    }

    /// Run every stage against `state`
    pub async fn execute(&self, state: SharedState) -> Execution {
        let mut summary = RunSummary::new();
        let mut state = state;
        info!(
            run_id = %summary.run_id,
            instrument = state.instrument_id(),
            symbol = state.symbol_name(),
            "Pipeline started"
        );

        let mut phase = PipelinePhase::Init;
        for stage in &self.stages {
            phase = phase.next();
            if stage.phase() != phase {
                error!(
                    run_id = %summary.run_id,
                    expected = %phase,
                    stage = stage.name(),
                    "Stage out of order"
                );
                let error = PipelineError::OutOfOrder {
                    stage: stage.name(),
                    expected: phase,
                    found: stage.phase(),
                };
                return abort(state, error, summary);
            }
            summary.trail.push(phase);
            info!(run_id = %summary.run_id, %phase, stage = stage.name(), "Entering phase");

            let update = match stage.run(&state).await {
                Ok(update) => update,
                Err(source) => {
                    error!(run_id = %summary.run_id, %phase, %source, "Stage failed");
                    return abort(state, PipelineError::Aborted { phase, source }, summary);
                }
            };

            let status = if update.is_degraded() {
                StageStatus::Degraded
            } else {
                StageStatus::Ok
            };

            match check_ownership(stage.as_ref(), &update).and_then(|()| state.merge(update)) {
                Ok(next) => state = next,
                Err(violation) => {
                    error!(run_id = %summary.run_id, %phase, %violation, "Merge contract violated");
                    return abort(state, PipelineError::Contract(violation), summary);
                }
            }

            summary.stages.push(StageOutcome {
                stage: stage.name(),
                phase,
                status,
            });
        }

        let pending = state.pending_fields();
        if !pending.is_empty() {
            return abort(state, PipelineError::Incomplete(pending), summary);
        }

        summary.trail.push(PipelinePhase::Done);
        info!(
            run_id = %summary.run_id,
            degraded = summary.degraded_count(),
            "Pipeline finished"
        );
        Execution::Done { state, summary }
    }
}

fn abort(state: SharedState, error: PipelineError, mut summary: RunSummary) -> Execution {
    summary.trail.push(PipelinePhase::Aborted);
    warn!(run_id = %summary.run_id, %error, "Pipeline aborted");
    Execution::Aborted {
        state,
        error,
        summary,
    }
}

/// Reject updates carrying fields the stage does not own
fn check_ownership(stage: &dyn Stage, update: &StateUpdate) -> std::result::Result<(), MergeError> {
    match update
        .fields()
        .into_iter()
        .find(|field| !stage.owned_fields().contains(field))
    {
        Some(field) => Err(MergeError::NotOwned {
            stage: stage.name(),
            field,
        }),
        None => Ok(()),
    }
}

/// Builder for [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    price_history: Option<Arc<dyn PriceHistory>>,
    news_search: Option<Arc<dyn NewsSearch>>,
    web_search: Option<Arc<dyn WebSearch>>,
    llm_provider: Option<Arc<dyn LLMProvider>>,
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    pub fn price_history(mut self, history: Arc<dyn PriceHistory>) -> Self {
        self.price_history = Some(history);
        self
    }

    pub fn news_search(mut self, search: Arc<dyn NewsSearch>) -> Self {
        self.news_search = Some(search);
        self
    }

    pub fn web_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.web_search = Some(search);
        self
    }

    pub fn llm_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.llm_provider = Some(provider);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline; every collaborator is required
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let history = self.price_history.ok_or_else(|| missing("price_history"))?;
        let news = self.news_search.ok_or_else(|| missing("news_search"))?;
        let web = self.web_search.ok_or_else(|| missing("web_search"))?;
        let llm = self.llm_provider.ok_or_else(|| missing("llm_provider"))?;

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(Recovering::new(TechnicalsStage::new(history, &config.market))),
            Box::new(Recovering::new(NewsStage::new(news, &config.market))),
            Box::new(Recovering::new(WebStrategyStage::new(web, &config.market))),
            Box::new(SynthesisStage::new(llm, &config)),
        ];

        Ok(Pipeline { stages })
    }
}

fn missing(collaborator: &str) -> PipelineError {
    PipelineError::Configuration(format!("{collaborator} is required"))
}
