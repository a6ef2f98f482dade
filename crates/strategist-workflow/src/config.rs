//! Pipeline configuration

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use strategist_market::MarketConfig;

/// Language of the report narrative
///
/// The decision label stays `BUY`, `SELL` or `WAIT` whatever the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReportLanguage {
    #[default]
    English,
    French,
}

impl ReportLanguage {
    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
        }
    }

    /// Language name used inside the prompt
    pub fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
        }
    }
}

impl fmt::Display for ReportLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ReportLanguage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "fr" | "french" | "français" | "francais" => Ok(Self::French),
            other => Err(format!("Unsupported report language: {other}")),
        }
    }
}

/// Configuration for a [`Pipeline`](crate::Pipeline)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Model used by the synthesis stage
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Max tokens of the report
    pub max_tokens: usize,

    /// Timeout for the reasoning call
    pub reasoning_timeout: Duration,

    /// Language of the report narrative
    pub language: ReportLanguage,

    /// Settings of the data-gathering stages
    pub market: MarketConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.3,
            max_tokens: 8192,
            reasoning_timeout: Duration::from_secs(120),
            language: ReportLanguage::English,
            market: MarketConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "model must not be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(PipelineError::Configuration(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(PipelineError::Configuration(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.reasoning_timeout.is_zero() {
            return Err(PipelineError::Configuration(
                "reasoning_timeout must be greater than 0".to_string(),
            ));
        }

        self.market
            .validate()
            .map_err(|e| PipelineError::Configuration(e.to_string()))
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    reasoning_timeout: Option<Duration>,
    language: Option<ReportLanguage>,
    market: Option<MarketConfig>,
}

impl PipelineConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn reasoning_timeout(mut self, timeout: Duration) -> Self {
        self.reasoning_timeout = Some(timeout);
        self
    }

    pub fn language(mut self, language: ReportLanguage) -> Self {
        self.language = Some(language);
        self
    }

    pub fn market(mut self, market: MarketConfig) -> Self {
        self.market = Some(market);
        self
    }

    /// Load overrides from the environment
    ///
    /// Reads `STRATEGIST_MODEL` and `STRATEGIST_REPORT_LANG`. An unknown
    /// language code is ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(model) = std::env::var("STRATEGIST_MODEL") {
            self.model = Some(model);
        }
        if let Some(language) = std::env::var("STRATEGIST_REPORT_LANG")
            .ok()
            .and_then(|code| code.parse().ok())
        {
            self.language = Some(language);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();

        let config = PipelineConfig {
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            reasoning_timeout: self.reasoning_timeout.unwrap_or(defaults.reasoning_timeout),
            language: self.language.unwrap_or(defaults.language),
            market: self.market.unwrap_or(defaults.market),
        };

        config.validate()?;
        Ok(config)
    }
}
