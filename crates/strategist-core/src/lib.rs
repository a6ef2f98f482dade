//! Core abstractions for market-strategist
//!
//! This crate defines the types every pipeline stage agrees on:
//!
//! - [`SharedState`]: the write-once record accumulated during one run
//! - [`StateUpdate`]: the partial update a stage hands back to the driver
//! - [`Stage`] / [`GatherStage`]: the stage interface and its recovering wrapper
//! - [`StageError`] / [`MergeError`]: the error taxonomy

pub mod error;
pub mod phase;
pub mod stage;
pub mod state;

pub use error::{MergeError, Result, StageError};
pub use phase::PipelinePhase;
pub use stage::{GatherStage, Recovering, Stage};
pub use state::{
    Digest, NO_DATA, SharedState, StateField, StateUpdate, TechnicalIndicators,
    TechnicalSnapshot, Trend,
};
