//! News stage

use super::call_provider;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strategist_core::{
    Digest, GatherStage, PipelinePhase, Result, SharedState, StageError, StateField, StateUpdate,
};
use strategist_market::{MarketConfig, NewsSearch};
use tracing::debug;

/// Digest stored when no headline could be fetched
pub const NEWS_PLACEHOLDER: &str = "No news accessible via API.";

/// Collects the latest headlines for the display symbol
pub struct NewsStage {
    search: Arc<dyn NewsSearch>,
    limit: usize,
    timeout: Duration,
}

impl NewsStage {
    pub fn new(search: Arc<dyn NewsSearch>, config: &MarketConfig) -> Self {
        Self {
            search,
            limit: config.news_limit,
            timeout: config.news_timeout,
        }
    }
}

#[async_trait]
impl GatherStage for NewsStage {
    type Output = Digest;

    const OWNED: &'static [StateField] = &[StateField::NewsDigest];

    fn name(&self) -> &'static str {
        "news"
    }

    fn phase(&self) -> PipelinePhase {
        PipelinePhase::News
    }

    async fn gather(&self, state: &SharedState) -> Result<Digest> {
        let symbol = state.symbol_name();
        let provider = self.search.name();
        let response =
            call_provider(provider, self.timeout, self.search.search_news(symbol)).await?;

        if !response.is_success() {
            return Err(StageError::unreachable(
                provider,
                format!("status {}", response.status),
            ));
        }
        if response.items.is_empty() {
            return Err(StageError::unreachable(provider, "no headlines returned"));
        }
        debug!(symbol, items = response.items.len(), "Received headlines");

        let digest = response
            .items
            .iter()
            .take(self.limit)
            .map(|item| format!("- {}", item.title))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Digest::Available(digest))
    }

    fn degrade(&self, _error: &StageError) -> Digest {
        Digest::Unavailable(NEWS_PLACEHOLDER.to_string())
    }

    fn into_update(&self, output: Digest) -> StateUpdate {
        StateUpdate::news(output)
    }
}
