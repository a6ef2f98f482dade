//! TradingView news-mediator client
//!
//! Headlines are looked up per display symbol. The endpoint expects the
//! symbol qualified by an exchange prefix (`TICKMILL:EURUSD`) and a language
//! filter; both come from [`MarketConfig`].

use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::providers::{NewsItem, NewsResponse, NewsSearch};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

const TRADINGVIEW_NEWS_URL: &str = "https://news-mediator.tradingview.com/public/view/v1/symbol";

/// News search backed by TradingView's public headline feed
pub struct TradingViewNews {
    client: Client,
    base_url: String,
    language: String,
    exchange: String,
}

/// The feed answers either with a bare list or with `{ "items": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NewsPayload {
    List(Vec<RawHeadline>),
    Wrapped { items: Vec<RawHeadline> },
}

#[derive(Debug, Deserialize)]
struct RawHeadline {
    title: String,
}

impl NewsPayload {
    fn into_items(self) -> Vec<NewsItem> {
        let raw = match self {
            Self::List(items) | Self::Wrapped { items } => items,
        };
        raw.into_iter()
            .map(|h| NewsItem { title: h.title })
            .collect()
    }
}

impl TradingViewNews {
    /// Create a client using the language, exchange and timeout from `config`
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.news_timeout).build()?;

        Ok(Self {
            client,
            base_url: TRADINGVIEW_NEWS_URL.to_string(),
            language: config.news_language.clone(),
            exchange: config.news_exchange.clone(),
        })
    }

    /// Point the client at another host (useful for local fixtures)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, symbol: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("filter", format!("lang:{}", self.language)),
                ("filter", format!("symbol:{}:{symbol}", self.exchange)),
                ("client", "web".to_string()),
                ("user_prostatus", "non_pro".to_string()),
            ],
        )
        .map_err(|e| MarketError::ConfigError(format!("Invalid news URL: {e}")))
    }
}

#[async_trait]
impl NewsSearch for TradingViewNews {
    #[instrument(skip(self))]
    async fn search_news(&self, symbol: &str) -> Result<NewsResponse> {
        let url = self.request_url(symbol)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            debug!(status = status.as_u16(), "News feed answered with an error status");
            return Ok(NewsResponse {
                status: status.as_u16(),
                items: Vec::new(),
            });
        }

        let payload: NewsPayload = response.json().await?;
        let items = payload.into_items();
        debug!(items = items.len(), "Fetched headlines");

        Ok(NewsResponse {
            status: status.as_u16(),
            items,
        })
    }

    fn name(&self) -> &'static str {
        "tradingview"
    }
}
