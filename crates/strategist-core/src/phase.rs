//! Pipeline phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the pipeline driver
///
/// The only path is `Init -> Technicals -> News -> WebStrategy -> Synthesis -> Done`.
/// `Aborted` is entered when the synthesis stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Init,
    Technicals,
    News,
    WebStrategy,
    Synthesis,
    Done,
    Aborted,
}

impl PipelinePhase {
    /// The phase that follows a successful completion of this one
    pub fn next(self) -> Self {
        match self {
            Self::Init => Self::Technicals,
            Self::Technicals => Self::News,
            Self::News => Self::WebStrategy,
            Self::WebStrategy => Self::Synthesis,
            Self::Synthesis | Self::Done => Self::Done,
            Self::Aborted => Self::Aborted,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Technicals => "technicals",
            Self::News => "news",
            Self::WebStrategy => "web_strategy",
            Self::Synthesis => "synthesis",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
