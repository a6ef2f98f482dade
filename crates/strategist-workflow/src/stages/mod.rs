//! The four pipeline stages
//!
//! The data stages implement [`GatherStage`](strategist_core::GatherStage)
//! and are run through [`Recovering`](strategist_core::Recovering); the
//! synthesis stage implements [`Stage`](strategist_core::Stage) directly so
//! that its failure reaches the driver.

pub mod news;
pub mod synthesis;
pub mod technicals;
pub mod web_strategy;

pub use news::{NEWS_PLACEHOLDER, NewsStage};
pub use synthesis::SynthesisStage;
pub use technicals::TechnicalsStage;
pub use web_strategy::{WEB_PLACEHOLDER, WebStrategyStage, strategy_query};

use std::future::Future;
use std::time::Duration;
use strategist_core::StageError;
use strategist_market::MarketError;

/// Await a collaborator call, mapping faults and timeouts to `ProviderUnreachable`
pub(crate) async fn call_provider<T, F>(
    provider: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, StageError>
where
    F: Future<Output = Result<T, MarketError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(StageError::unreachable(provider, err)),
        Err(_) => Err(StageError::unreachable(
            provider,
            format!("timed out after {}s", timeout.as_secs_f64()),
        )),
    }
}
