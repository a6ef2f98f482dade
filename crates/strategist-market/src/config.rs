//! Configuration for the data-gathering collaborators

use crate::error::{MarketError, Result};
use crate::providers::Lookback;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by the market-data clients and stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// History window requested from the price provider
    pub history_lookback: Lookback,

    /// Timeout for the price-history call
    pub history_timeout: Duration,

    /// Timeout for the news search call
    pub news_timeout: Duration,

    /// Timeout for the web search call
    pub web_timeout: Duration,

    /// Maximum number of headlines kept in the news digest
    pub news_limit: usize,

    /// Number of web results requested and kept
    pub web_max_results: usize,

    /// Characters of each web result kept in the digest
    pub excerpt_chars: usize,

    /// Language filter passed to the news endpoint (ISO 639-1)
    pub news_language: String,

    /// Exchange prefix combined with the display symbol by the news endpoint
    pub news_exchange: String,

    /// Tavily API key
    pub tavily_api_key: Option<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            history_lookback: Lookback::Months(3),
            history_timeout: Duration::from_secs(30),
            news_timeout: Duration::from_secs(10),
            web_timeout: Duration::from_secs(30),
            news_limit: 5,
            web_max_results: 3,
            excerpt_chars: 300,
            news_language: "en".to_string(),
            news_exchange: "TICKMILL".to_string(),
            tavily_api_key: None,
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.news_limit == 0 {
            return Err(MarketError::ConfigError(
                "news_limit must be greater than 0".to_string(),
            ));
        }

        if self.web_max_results == 0 {
            return Err(MarketError::ConfigError(
                "web_max_results must be greater than 0".to_string(),
            ));
        }

        for (name, timeout) in [
            ("history_timeout", self.history_timeout),
            ("news_timeout", self.news_timeout),
            ("web_timeout", self.web_timeout),
        ] {
            if timeout.is_zero() {
                return Err(MarketError::ConfigError(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        Ok(())
    }

    /// Tavily key, required by the production web search client
    pub fn require_tavily_key(&self) -> Result<&str> {
        self.tavily_api_key.as_deref().ok_or_else(|| {
            MarketError::ConfigError("TAVILY_API_KEY environment variable not set".to_string())
        })
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    history_lookback: Option<Lookback>,
    history_timeout: Option<Duration>,
    news_timeout: Option<Duration>,
    web_timeout: Option<Duration>,
    news_limit: Option<usize>,
    web_max_results: Option<usize>,
    excerpt_chars: Option<usize>,
    news_language: Option<String>,
    news_exchange: Option<String>,
    tavily_api_key: Option<String>,
}

impl MarketConfigBuilder {
    pub fn history_lookback(mut self, lookback: Lookback) -> Self {
        self.history_lookback = Some(lookback);
        self
    }

    pub fn history_timeout(mut self, duration: Duration) -> Self {
        self.history_timeout = Some(duration);
        self
    }

    pub fn news_timeout(mut self, duration: Duration) -> Self {
        self.news_timeout = Some(duration);
        self
    }

    pub fn web_timeout(mut self, duration: Duration) -> Self {
        self.web_timeout = Some(duration);
        self
    }

    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    pub fn web_max_results(mut self, max_results: usize) -> Self {
        self.web_max_results = Some(max_results);
        self
    }

    pub fn excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = Some(chars);
        self
    }

    pub fn news_language(mut self, language: impl Into<String>) -> Self {
        self.news_language = Some(language.into());
        self
    }

    pub fn news_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.news_exchange = Some(exchange.into());
        self
    }

    pub fn tavily_api_key(mut self, key: impl Into<String>) -> Self {
        self.tavily_api_key = Some(key.into());
        self
    }

    /// Load keys and overrides from the environment
    ///
    /// Reads `TAVILY_API_KEY`, `STRATEGIST_NEWS_LANG` and `STRATEGIST_NEWS_EXCHANGE`.
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("TAVILY_API_KEY") {
            self.tavily_api_key = Some(key);
        }
        if let Ok(lang) = std::env::var("STRATEGIST_NEWS_LANG") {
            self.news_language = Some(lang);
        }
        if let Ok(exchange) = std::env::var("STRATEGIST_NEWS_EXCHANGE") {
            self.news_exchange = Some(exchange);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            history_lookback: self.history_lookback.unwrap_or(defaults.history_lookback),
            history_timeout: self.history_timeout.unwrap_or(defaults.history_timeout),
            news_timeout: self.news_timeout.unwrap_or(defaults.news_timeout),
            web_timeout: self.web_timeout.unwrap_or(defaults.web_timeout),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            web_max_results: self.web_max_results.unwrap_or(defaults.web_max_results),
            excerpt_chars: self.excerpt_chars.unwrap_or(defaults.excerpt_chars),
            news_language: self.news_language.unwrap_or(defaults.news_language),
            news_exchange: self.news_exchange.unwrap_or(defaults.news_exchange),
            tavily_api_key: self.tavily_api_key,
        };

        config.validate()?;
        Ok(config)
    }
}
