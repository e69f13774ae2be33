//! Canned trading strategies and the signal contract they implement.
//!
//! A strategy is a [`SignalRule`]: it precomputes its indicators once over the
//! loaded series, then emits one [`Signal`] per bar. Order execution, cash and
//! commission accounting belong to the backtest runner.
//!
//! Indicator series are causal (bar `i` only sees closes `0..=i`), so computing
//! them up front is equivalent to recomputing them on every bar.

pub mod bollinger_reversion;
pub mod macs;

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;
use std::fmt;
use std::str::FromStr;

pub use bollinger_reversion::BollingerReversion;
pub use macs::Macs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Hold,
    /// Open a long position, flipping out of a short one.
    Buy,
    /// Open a short position, flipping out of a long one.
    Sell,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Flat,
    Long,
    Short,
}

pub trait SignalRule {
    fn name(&self) -> &str;

    /// Fewest bars for which the rule can emit a non-`Hold` signal.
    fn min_bars(&self) -> usize;

    fn init(&mut self, bars: &[OhlcvBar]);

    /// Evaluate bar `index` given the position held going into it.
    fn next(&mut self, index: usize, bar: &OhlcvBar, position: PositionSide) -> Signal;

    /// Indicator series computed by `init`, for chart overlays.
    fn indicators(&self) -> Vec<&IndicatorSeries>;
}

/// `a` was strictly below `b` on the previous bar and is at or above it now.
pub fn crosses_above(prev_a: f64, prev_b: f64, curr_a: f64, curr_b: f64) -> bool {
    prev_a < prev_b && curr_a >= curr_b
}

/// `a` was strictly above `b` on the previous bar and is at or below it now.
pub fn crosses_below(prev_a: f64, prev_b: f64, curr_a: f64, curr_b: f64) -> bool {
    prev_a > prev_b && curr_a <= curr_b
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Macs,
    BollingerBands,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Macs, StrategyKind::BollingerBands];

    pub fn build(self) -> Box<dyn SignalRule> {
        match self {
            StrategyKind::Macs => Box::new(Macs::default()),
            StrategyKind::BollingerBands => Box::new(BollingerReversion::default()),
        }
    }

    /// Identifier used on the command line and in chart file names.
    pub fn slug(self) -> &'static str {
        match self {
            StrategyKind::Macs => "macs",
            StrategyKind::BollingerBands => "bollinger",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Macs => write!(f, "MACS"),
            StrategyKind::BollingerBands => write!(f, "Bollinger Bands"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macs" | "sma" | "crossover" => Ok(StrategyKind::Macs),
            "bollinger" | "bollinger-bands" | "bb" => Ok(StrategyKind::BollingerBands),
            other => Err(format!(
                "unknown strategy {other:?} (expected 'macs' or 'bollinger')"
            )),
        }
    }
}
