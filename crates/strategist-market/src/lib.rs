//! Market data collaborators for market-strategist
//!
//! This crate holds everything the data-gathering stages talk to:
//!
//! - Collaborator traits ([`PriceHistory`], [`NewsSearch`], [`WebSearch`])
//! - Production clients (Yahoo Finance, TradingView news, Tavily search)
//! - Indicator math over closing prices (SMA-20, SMA-50, RSI-14)
//! - [`MarketConfig`] with timeouts and per-stage limits

pub mod api;
pub mod config;
pub mod error;
pub mod indicators;
pub mod providers;

pub use api::{TavilySearch, TradingViewNews, YahooPriceHistory};
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use providers::{
    Bar, Lookback, NewsItem, NewsResponse, NewsSearch, PriceHistory, WebResult, WebSearch,
};
