//! Shared pipeline state and the merge contract
//!
//! [`SharedState`] is created once per run from the two instrument
//! identifiers. Every data field starts as `None` ("not yet run") and is
//! filled exactly once by the stage that owns it, either with real data or
//! with a degraded placeholder ("ran and failed").

use crate::error::MergeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error text carried by the technical placeholder when history is empty or too short
pub const NO_DATA: &str = "no data";

/// Direction of the moving-average crossover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// `Bullish` iff the short average is strictly above the long one
    pub fn from_averages(short: f64, long: f64) -> Self {
        if short > long {
            Self::Bullish
        } else {
            Self::Bearish
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator values computed from the closing-price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    /// Close of the most recent bar
    pub price: f64,
    /// 14-period RSI at the most recent bar
    pub rsi: f64,
    /// 20-period simple moving average
    pub sma20: f64,
    /// 50-period simple moving average
    pub sma50: f64,
    pub trend_sma: Trend,
    /// Close of the second-to-last bar
    pub previous_close: f64,
}

/// Output of the technical-analysis stage
///
/// Serializes as a flat object: either the indicator fields or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TechnicalSnapshot {
    Indicators(TechnicalIndicators),
    Unavailable { error: String },
}

impl TechnicalSnapshot {
    /// Placeholder for an empty or too-short history
    pub fn no_data() -> Self {
        Self::unavailable(NO_DATA)
    }

    pub fn unavailable(error: impl Into<String>) -> Self {
        Self::Unavailable {
            error: error.into(),
        }
    }

    pub fn indicators(&self) -> Option<&TechnicalIndicators> {
        match self {
            Self::Indicators(indicators) => Some(indicators),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Flat key/value listing in a stable order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Indicators(i) => vec![
                ("price", i.price.to_string()),
                ("rsi", i.rsi.to_string()),
                ("sma20", i.sma20.to_string()),
                ("sma50", i.sma50.to_string()),
                ("trend_sma", i.trend_sma.to_string()),
                ("previous_close", i.previous_close.to_string()),
            ],
            Self::Unavailable { error } => vec![("error", error.clone())],
        }
    }
}

/// Text produced by the news and web-strategy stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Digest {
    /// Real content gathered from the provider
    Available(String),
    /// Fixed placeholder substituted after a failure
    Unavailable(String),
}

impl Digest {
    pub fn text(&self) -> &str {
        match self {
            Self::Available(text) | Self::Unavailable(text) => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// The data fields of [`SharedState`] a stage may write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    TechnicalSnapshot,
    NewsDigest,
    WebStrategyDigest,
    FinalReport,
}

impl StateField {
    pub const ALL: [StateField; 4] = [
        Self::TechnicalSnapshot,
        Self::NewsDigest,
        Self::WebStrategyDigest,
        Self::FinalReport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TechnicalSnapshot => "technical_snapshot",
            Self::NewsDigest => "news_digest",
            Self::WebStrategyDigest => "web_strategy_digest",
            Self::FinalReport => "final_report",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update returned by a stage
///
/// Only populated fields are written by [`SharedState::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub technical_snapshot: Option<TechnicalSnapshot>,
    pub news_digest: Option<Digest>,
    pub web_strategy_digest: Option<Digest>,
    pub final_report: Option<String>,
}

impl StateUpdate {
    pub fn technicals(snapshot: TechnicalSnapshot) -> Self {
        Self {
            technical_snapshot: Some(snapshot),
            ..Self::default()
        }
    }

    pub fn news(digest: Digest) -> Self {
        Self {
            news_digest: Some(digest),
            ..Self::default()
        }
    }

    pub fn web_strategy(digest: Digest) -> Self {
        Self {
            web_strategy_digest: Some(digest),
            ..Self::default()
        }
    }

    pub fn report(report: impl Into<String>) -> Self {
        Self {
            final_report: Some(report.into()),
            ..Self::default()
        }
    }

    /// Fields populated by this update
    pub fn fields(&self) -> Vec<StateField> {
        let populated = [
            self.technical_snapshot.is_some(),
            self.news_digest.is_some(),
            self.web_strategy_digest.is_some(),
            self.final_report.is_some(),
        ];
        StateField::ALL
            .into_iter()
            .zip(populated)
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Whether any populated value is a degraded placeholder
    pub fn is_degraded(&self) -> bool {
        self.technical_snapshot
            .as_ref()
            .is_some_and(TechnicalSnapshot::is_degraded)
            || self.news_digest.as_ref().is_some_and(Digest::is_degraded)
            || self
                .web_strategy_digest
                .as_ref()
                .is_some_and(Digest::is_degraded)
    }
}

/// Record accumulated over one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedState {
    instrument_id: String,
    symbol_name: String,
    technical_snapshot: Option<TechnicalSnapshot>,
    news_digest: Option<Digest>,
    web_strategy_digest: Option<Digest>,
    final_report: Option<String>,
}

impl SharedState {
    /// Create a state with every data field absent
    ///
    /// # Example
    ///
    /// ```
    /// use strategist_core::SharedState;
    ///
    /// let state = SharedState::new("EURUSD=X", "EURUSD");
    /// assert_eq!(state.instrument_id(), "EURUSD=X");
    /// assert!(state.technical_snapshot().is_none());
    /// ```
    pub fn new(instrument_id: impl Into<String>, symbol_name: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            symbol_name: symbol_name.into(),
            technical_snapshot: None,
            news_digest: None,
            web_strategy_digest: None,
            final_report: None,
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn symbol_name(&self) -> &str {
        &self.symbol_name
    }

    pub fn technical_snapshot(&self) -> Option<&TechnicalSnapshot> {
        self.technical_snapshot.as_ref()
    }

    pub fn news_digest(&self) -> Option<&Digest> {
        self.news_digest.as_ref()
    }

    pub fn web_strategy_digest(&self) -> Option<&Digest> {
        self.web_strategy_digest.as_ref()
    }

    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    /// Consume the state, keeping only the report
    pub fn into_report(self) -> Option<String> {
        self.final_report
    }

    /// Data fields that have not been written yet
    pub fn pending_fields(&self) -> Vec<StateField> {
        let written = [
            self.technical_snapshot.is_some(),
            self.news_digest.is_some(),
            self.web_strategy_digest.is_some(),
            self.final_report.is_some(),
        ];
        StateField::ALL
            .into_iter()
            .zip(written)
            .filter_map(|(field, set)| (!set).then_some(field))
            .collect()
    }

    /// Return a new state with the update's populated fields written
    ///
    /// Fields are write-once: writing a different value onto a field that is
    /// already set fails, while re-applying an identical value is a no-op.
    pub fn merge(&self, update: StateUpdate) -> Result<Self, MergeError> {
        let mut next = self.clone();
        write_once(
            &mut next.technical_snapshot,
            update.technical_snapshot,
            StateField::TechnicalSnapshot,
        )?;
        write_once(&mut next.news_digest, update.news_digest, StateField::NewsDigest)?;
        write_once(
            &mut next.web_strategy_digest,
            update.web_strategy_digest,
            StateField::WebStrategyDigest,
        )?;
        write_once(&mut next.final_report, update.final_report, StateField::FinalReport)?;
        Ok(next)
    }
}

fn write_once<T: PartialEq>(
    slot: &mut Option<T>,
    value: Option<T>,
    field: StateField,
) -> Result<(), MergeError> {
    let Some(value) = value else {
        return Ok(());
    };
    match slot {
        Some(existing) if *existing != value => Err(MergeError::AlreadyWritten(field)),
        _ => {
            *slot = Some(value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators() -> TechnicalSnapshot {
        TechnicalSnapshot::Indicators(TechnicalIndicators {
            price: 1.0842,
            rsi: 55.12345,
            sma20: 1.08,
            sma50: 1.07,
            trend_sma: Trend::Bullish,
            previous_close: 1.0831,
        })
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = SharedState::new("EURUSD=X", "EURUSD");
        assert_eq!(state.symbol_name(), "EURUSD");
        assert_eq!(state.pending_fields(), StateField::ALL.to_vec());
        assert!(state.final_report().is_none());
    }

    #[test]
    fn test_absent_differs_from_placeholder() {
        let state = SharedState::new("EURUSD=X", "EURUSD");
        let merged = state
            .merge(StateUpdate::technicals(TechnicalSnapshot::no_data()))
            .unwrap();

        assert!(state.technical_snapshot().is_none());
        assert_eq!(
            merged.technical_snapshot(),
            Some(&TechnicalSnapshot::no_data())
        );
    }

    #[test]
    fn test_merge_writes_only_populated_fields() {
        let state = SharedState::new("EURUSD=X", "EURUSD");
        let merged = state
            .merge(StateUpdate::news(Digest::Available("- headline".to_string())))
            .unwrap();

        assert_eq!(merged.news_digest().map(Digest::text), Some("- headline"));
        assert!(merged.technical_snapshot().is_none());
        assert!(merged.web_strategy_digest().is_none());
        assert_eq!(merged.instrument_id(), "EURUSD=X");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let state = SharedState::new("EURUSD=X", "EURUSD");
        let update = StateUpdate::technicals(indicators());

        let once = state.merge(update.clone()).unwrap();
        let twice = once.merge(update).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_rejects_overwrite() {
        let state = SharedState::new("EURUSD=X", "EURUSD")
            .merge(StateUpdate::report("# DECISION: WAIT"))
            .unwrap();

        let err = state
            .merge(StateUpdate::report("# DECISION: BUY"))
            .unwrap_err();
        assert_eq!(err, MergeError::AlreadyWritten(StateField::FinalReport));
        assert_eq!(state.final_report(), Some("# DECISION: WAIT"));
    }

    #[test]
    fn test_update_fields() {
        assert!(StateUpdate::default().is_empty());

        let update = StateUpdate {
            news_digest: Some(Digest::Unavailable("n/a".to_string())),
            final_report: Some("report".to_string()),
            ..StateUpdate::default()
        };
        assert_eq!(
            update.fields(),
            vec![StateField::NewsDigest, StateField::FinalReport]
        );
        assert!(update.is_degraded());
        assert!(!StateUpdate::technicals(indicators()).is_degraded());
    }

    #[test]
    fn test_snapshot_serialization_is_flat() {
        let json = serde_json::to_value(TechnicalSnapshot::no_data()).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "no data" }));

        let json = serde_json::to_value(indicators()).unwrap();
        assert_eq!(json["trend_sma"], "BULLISH");
        assert_eq!(json["rsi"], 55.12345);
    }

    #[test]
    fn test_snapshot_entries() {
        let entries = indicators().entries();
        assert_eq!(entries[0], ("price", "1.0842".to_string()));
        assert_eq!(entries[4], ("trend_sma", "BULLISH".to_string()));

        assert_eq!(
            TechnicalSnapshot::no_data().entries(),
            vec![("error", "no data".to_string())]
        );
    }

    #[test]
    fn test_trend_from_averages() {
        assert_eq!(Trend::from_averages(1.1, 1.0), Trend::Bullish);
        assert_eq!(Trend::from_averages(1.0, 1.0), Trend::Bearish);
        assert_eq!(Trend::from_averages(0.9, 1.0), Trend::Bearish);
    }
}
