//! Tavily web search client

use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::providers::{WebResult, WebSearch};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Web search backed by the Tavily API
pub struct TavilySearch {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    /// Create a client; fails when no Tavily key is configured
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let api_key = config.require_tavily_key()?.to_string();
        let client = Client::builder().timeout(config.web_timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: TAVILY_SEARCH_URL.to_string(),
        })
    }

    /// Point the client at another host (useful for local fixtures)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    #[instrument(skip(self))]
    async fn search_web(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>> {
        let body = SearchRequest {
            query,
            max_results,
            search_depth: "basic",
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::ApiError(format!(
                "Tavily API error {status}: {body}"
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        debug!(results = parsed.results.len(), "Fetched web results");

        Ok(parsed
            .results
            .into_iter()
            .take(max_results)
            .map(|hit| WebResult {
                url: hit.url,
                content: hit.content,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "tavily"
    }
}
