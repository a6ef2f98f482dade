//! Shared utilities for market-strategist
//!
//! This crate provides the logging setup and application-level
//! configuration used by the `strategist` binary.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, load_dotenv};
pub use logging::{init_tracing, init_tracing_json};
