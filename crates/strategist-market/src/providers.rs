//! Collaborator interfaces consumed by the data-gathering stages

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One historical price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Bar where every price equals `close`
    pub fn from_close(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Rolling window of history to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookback {
    Days(u32),
    /// Calendar months
    Months(u32),
}

impl Lookback {
    /// Start of the window ending at `end`
    pub fn start_from(self, end: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Days(days) => end - chrono::Duration::days(i64::from(days)),
            Self::Months(months) => end
                .checked_sub_months(Months::new(months))
                .unwrap_or_else(|| end - chrono::Duration::days(30 * i64::from(months))),
        }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::Months(3)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(days) => write!(f, "{days}d"),
            Self::Months(months) => write!(f, "{months}mo"),
        }
    }
}

/// A news headline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
}

/// Raw answer of a news search: HTTP status plus parsed items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsResponse {
    pub status: u16,
    pub items: Vec<NewsItem>,
}

impl NewsResponse {
    pub fn ok(items: Vec<NewsItem>) -> Self {
        Self { status: 200, items }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A web search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
    pub url: String,
    pub content: String,
}

/// Source of historical price bars
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// Time-ordered bars covering `lookback`; may be empty
    async fn get_bars(&self, instrument_id: &str, lookback: Lookback) -> Result<Vec<Bar>>;

    fn name(&self) -> &'static str;
}

/// Headline search keyed by display symbol
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search_news(&self, symbol: &str) -> Result<NewsResponse>;

    fn name(&self) -> &'static str;
}

/// Free-text web search
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search_web(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>>;

    fn name(&self) -> &'static str;
}
