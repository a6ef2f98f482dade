//! LLM provider abstraction layer for market-strategist
//!
//! This crate provides provider-agnostic types for a single-shot completion:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - The [`LLMProvider`] trait the synthesis stage depends on
//! - A Gemini implementation (behind the `gemini` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

#[cfg(feature = "gemini")]
pub mod providers;
