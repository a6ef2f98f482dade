//! Sequential analysis pipeline for market-strategist
//!
//! This crate wires the collaborators from `strategist-market` and
//! `strategist-llm` into four stages and drives them over one
//! [`SharedState`](strategist_core::SharedState):
//!
//! - [`stages`]: technicals, news, web strategy and synthesis
//! - [`prompts`]: MiniJinja templates for the reasoning call
//! - [`Pipeline`]: the driver and its builder
//! - [`Decision`]: parsing of the report's decision line

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod stages;

pub use config::{PipelineConfig, PipelineConfigBuilder, ReportLanguage};
pub use error::{PipelineError, PromptError, Result};
pub use pipeline::{
    Execution, Pipeline, PipelineBuilder, RunSummary, StageOutcome, StageStatus,
};
pub use prompts::{PromptBuilder, SynthesisPrompt};
pub use report::Decision;
pub use stages::{NEWS_PLACEHOLDER, WEB_PLACEHOLDER};
