//! Helpers for consumers of the final report

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static DECISION_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*#+[^\n]*?D[EÉ]CISION[^:\n]*:\s*[*_\[]*\s*(BUY|SELL|WAIT|ACHAT|VENTE|ATTENTE)\b")
        .ok()
});

/// Trading decision announced on the report's decision line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
    Wait,
}

impl Decision {
    /// Parse the first decision heading of a report
    ///
    /// Accepts `# DECISION: BUY` and the bold or bracketed variants models
    /// tend to produce. French labels map to their English counterpart.
    ///
    /// # Example
    ///
    /// ```
    /// use strategist_workflow::Decision;
    ///
    /// let report = "# DECISION: **SELL**\n\n## 1. Situation Synthesis\n...";
    /// assert_eq!(Decision::from_report(report), Some(Decision::Sell));
    /// assert_eq!(Decision::from_report("no heading"), None);
    /// ```
    pub fn from_report(report: &str) -> Option<Self> {
        let captures = DECISION_LINE.as_ref()?.captures(report)?;
        match captures.get(1)?.as_str().to_uppercase().as_str() {
            "BUY" | "ACHAT" => Some(Self::Buy),
            "SELL" | "VENTE" => Some(Self::Sell),
            "WAIT" | "ATTENTE" => Some(Self::Wait),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Wait => "WAIT",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
