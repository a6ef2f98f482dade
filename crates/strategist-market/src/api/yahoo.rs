//! Yahoo Finance price-history client

use crate::error::{MarketError, Result};
use crate::providers::{Bar, Lookback, PriceHistory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Yahoo Finance client
#[derive(Debug, Clone, Default)]
pub struct YahooPriceHistory {}

impl YahooPriceHistory {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Daily bars between `start` and `end`
    pub async fn get_history(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            MarketError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(instrument_id, start_odt, end_odt)
            .await
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        Ok(quotes
            .iter()
            .map(|q| Bar {
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }
}

#[async_trait]
impl PriceHistory for YahooPriceHistory {
    #[instrument(skip(self))]
    async fn get_bars(&self, instrument_id: &str, lookback: Lookback) -> Result<Vec<Bar>> {
        let end = Utc::now();
        let start = lookback.start_from(end);

        let mut bars = self.get_history(instrument_id, start, end).await?;
        bars.sort_by_key(|bar| bar.timestamp);

        debug!(bars = bars.len(), %lookback, "Fetched price history");
        Ok(bars)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
