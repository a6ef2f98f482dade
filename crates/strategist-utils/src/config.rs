//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

/// Load variables from a `.env` file in the current directory or its parents
///
/// Returns the path of the file that was loaded, or `None` when there is no
/// such file. Variables already set in the process environment win.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Application-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "market-strategist".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `STRATEGIST_ENV`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(environment) = std::env::var("STRATEGIST_ENV") {
            config.environment = environment;
        }
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app_name, "market-strategist");
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_flag() {
        let config = AppConfig {
            environment: "Production".to_string(),
            ..AppConfig::default()
        };
        assert!(config.is_production());
    }
}
