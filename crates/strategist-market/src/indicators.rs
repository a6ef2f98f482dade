//! Indicator math over closing prices
//!
//! Averages and RSI come from the `ta` crate. `ta`'s RSI smooths gains and
//! losses with an exponential moving average (alpha = 2 / (n + 1)). While
//! fewer bars than a period have been seen, `ta`'s moving averages cover the
//! bars seen so far.

use crate::error::{MarketError, Result};
use crate::providers::Bar;
use strategist_core::{TechnicalIndicators, Trend};
use ta::Next;
use ta::indicators::{RelativeStrengthIndex, SimpleMovingAverage};

pub const SHORT_SMA_PERIOD: usize = 20;
pub const LONG_SMA_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;

/// Bars needed for a "current" and a "previous" close
pub const MIN_BARS: usize = 2;

/// Decimal places kept for display
pub const DISPLAY_DECIMALS: i32 = 5;

/// Round to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Compute the snapshot indicators, or `None` with fewer than [`MIN_BARS`] bars
///
/// The last bar is "current" and the second-to-last is "previous". The trend
/// label compares the unrounded averages.
///
/// With fewer bars than a moving-average period, that average is the mean of
/// every bar available, so a 25-bar history yields a 25-bar "SMA 50".
pub fn technical_indicators(bars: &[Bar]) -> Result<Option<TechnicalIndicators>> {
    let [.., previous, current] = bars else {
        return Ok(None);
    };

    let mut short_sma = SimpleMovingAverage::new(SHORT_SMA_PERIOD).map_err(indicator_error)?;
    let mut long_sma = SimpleMovingAverage::new(LONG_SMA_PERIOD).map_err(indicator_error)?;
    let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD).map_err(indicator_error)?;

    let (mut sma20, mut sma50, mut rsi_value) = (0.0, 0.0, 0.0);
    for bar in bars {
        sma20 = short_sma.next(bar.close);
        sma50 = long_sma.next(bar.close);
        rsi_value = rsi.next(bar.close);
    }

    Ok(Some(TechnicalIndicators {
        price: round_to(current.close, DISPLAY_DECIMALS),
        rsi: round_to(rsi_value, DISPLAY_DECIMALS),
        sma20: round_to(sma20, DISPLAY_DECIMALS),
        sma50: round_to(sma50, DISPLAY_DECIMALS),
        trend_sma: Trend::from_averages(sma20, sma50),
        previous_close: round_to(previous.close, DISPLAY_DECIMALS),
    }))
}

/// Interpret an RSI value
pub fn interpret_rsi(rsi: f64) -> &'static str {
    if rsi > 70.0 {
        "Overbought"
    } else if rsi < 30.0 {
        "Oversold"
    } else {
        "Neutral"
    }
}

fn indicator_error(err: impl std::fmt::Display) -> MarketError {
    MarketError::IndicatorError(err.to_string())
}
