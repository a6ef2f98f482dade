//! HTTP clients for the external market-data providers

pub mod tavily;
pub mod tradingview;
pub mod yahoo;

pub use tavily::TavilySearch;
pub use tradingview::TradingViewNews;
pub use yahoo::YahooPriceHistory;
