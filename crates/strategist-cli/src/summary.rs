//! Terminal rendering of a finished run

use comfy_table::Table;
use strategist_core::TechnicalSnapshot;
use strategist_market::indicators::interpret_rsi;
use strategist_workflow::{Execution, StageStatus};

/// Separator printed around the report
pub fn rule() -> String {
    "=".repeat(50)
}

/// Table of the technical snapshot, with the RSI reading spelled out
pub fn technicals_table(snapshot: &TechnicalSnapshot) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Indicator", "Value"]);

    for (key, value) in snapshot.entries() {
        table.add_row(vec![key.to_string(), value]);
    }
    if let Some(indicators) = snapshot.indicators() {
        table.add_row(vec![
            "rsi_reading".to_string(),
            interpret_rsi(indicators.rsi).to_string(),
        ]);
    }

    table
}

/// Table of stage outcomes followed by the final phase
pub fn stages_table(execution: &Execution) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Stage", "Phase", "Status"]);

    for outcome in &execution.summary().stages {
        let status = match outcome.status {
            StageStatus::Ok => "ok",
            StageStatus::Degraded => "degraded",
        };
        table.add_row(vec![outcome.stage, outcome.phase.as_str(), status]);
    }
    table.add_row(vec!["pipeline", execution.phase().as_str(), ""]);

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategist_core::{TechnicalIndicators, Trend};

    #[test]
    fn test_technicals_table() {
        let snapshot = TechnicalSnapshot::Indicators(TechnicalIndicators {
            price: 1.0842,
            rsi: 74.2,
            sma20: 1.081,
            sma50: 1.075,
            trend_sma: Trend::Bullish,
            previous_close: 1.0831,
        });

        let rendered = technicals_table(&snapshot).to_string();
        assert!(rendered.contains("trend_sma"));
        assert!(rendered.contains("BULLISH"));
        assert!(rendered.contains("Overbought"));
    }

    #[test]
    fn test_unavailable_technicals_table() {
        let rendered = technicals_table(&TechnicalSnapshot::no_data()).to_string();
        assert!(rendered.contains("no data"));
        assert!(!rendered.contains("rsi_reading"));
    }
}
