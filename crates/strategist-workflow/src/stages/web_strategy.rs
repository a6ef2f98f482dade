//! Web-strategy stage

use super::call_provider;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strategist_core::{
    Digest, GatherStage, PipelinePhase, Result, SharedState, StageError, StateField, StateUpdate,
};
use strategist_market::{MarketConfig, WebResult, WebSearch};
use tracing::debug;

/// Digest stored when the web search gave nothing usable
pub const WEB_PLACEHOLDER: &str = "Could not fetch web strategies.";

/// Free-text query sent to the web search collaborator
pub fn strategy_query(symbol: &str) -> String {
    format!("best trading strategy for {symbol} current market conditions, forward-looking forecast")
}

/// Collects excerpts of current strategy commentary
pub struct WebStrategyStage {
    search: Arc<dyn WebSearch>,
    max_results: usize,
    excerpt_chars: usize,
    timeout: Duration,
}

impl WebStrategyStage {
    pub fn new(search: Arc<dyn WebSearch>, config: &MarketConfig) -> Self {
        Self {
            search,
            max_results: config.web_max_results,
            excerpt_chars: config.excerpt_chars,
            timeout: config.web_timeout,
        }
    }

    fn block(&self, result: &WebResult) -> String {
        let excerpt: String = result.content.chars().take(self.excerpt_chars).collect();
        format!("Source: {}\nContent: {excerpt}...", result.url)
    }
}

#[async_trait]
impl GatherStage for WebStrategyStage {
    type Output = Digest;

    const OWNED: &'static [StateField] = &[StateField::WebStrategyDigest];

    fn name(&self) -> &'static str {
        "web_strategy"
    }

    fn phase(&self) -> PipelinePhase {
        PipelinePhase::WebStrategy
    }

    async fn gather(&self, state: &SharedState) -> Result<Digest> {
        let query = strategy_query(state.symbol_name());
        let provider = self.search.name();
        let results = call_provider(
            provider,
            self.timeout,
            self.search.search_web(&query, self.max_results),
        )
        .await?;

        if results.is_empty() {
            return Err(StageError::unreachable(provider, "no results returned"));
        }
        debug!(results = results.len(), "Received web results");

        let digest = results
            .iter()
            .take(self.max_results)
            .map(|result| self.block(result))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Digest::Available(digest))
    }

    fn degrade(&self, _error: &StageError) -> Digest {
        Digest::Unavailable(WEB_PLACEHOLDER.to_string())
    }

    fn into_update(&self, output: Digest) -> StateUpdate {
        StateUpdate::web_strategy(output)
    }
}
