//! Technical-analysis stage

use super::call_provider;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strategist_core::{
    GatherStage, NO_DATA, PipelinePhase, Result, SharedState, StageError, StateField,
    StateUpdate, TechnicalSnapshot,
};
use strategist_market::indicators::technical_indicators;
use strategist_market::{Lookback, MarketConfig, PriceHistory};
use tracing::debug;

/// Computes the indicator snapshot from recent daily bars
pub struct TechnicalsStage {
    history: Arc<dyn PriceHistory>,
    lookback: Lookback,
    timeout: Duration,
}

impl TechnicalsStage {
    pub fn new(history: Arc<dyn PriceHistory>, config: &MarketConfig) -> Self {
        Self {
            history,
            lookback: config.history_lookback,
            timeout: config.history_timeout,
        }
    }
}

#[async_trait]
impl GatherStage for TechnicalsStage {
    type Output = TechnicalSnapshot;

    const OWNED: &'static [StateField] = &[StateField::TechnicalSnapshot];

    fn name(&self) -> &'static str {
        "technicals"
    }

    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Technicals
    }

    async fn gather(&self, state: &SharedState) -> Result<TechnicalSnapshot> {
        let instrument = state.instrument_id();
        let bars = call_provider(
            self.history.name(),
            self.timeout,
            self.history.get_bars(instrument, self.lookback),
        )
        .await?;
        debug!(instrument, bars = bars.len(), "Received price history");

        let indicators = technical_indicators(&bars)
            .map_err(|e| StageError::unreachable(self.history.name(), e))?
            .ok_or_else(|| StageError::DataUnavailable {
                instrument: instrument.to_string(),
                reason: format!("{} bars received", bars.len()),
            })?;

        Ok(TechnicalSnapshot::Indicators(indicators))
    }

    fn degrade(&self, error: &StageError) -> TechnicalSnapshot {
        match error {
            StageError::DataUnavailable { .. } => TechnicalSnapshot::unavailable(NO_DATA),
            other => TechnicalSnapshot::unavailable(other.to_string()),
        }
    }

    fn into_update(&self, output: TechnicalSnapshot) -> StateUpdate {
        StateUpdate::technicals(output)
    }
}
